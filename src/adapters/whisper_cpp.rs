use std::path::Path;

use tracing::{debug, info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::adapters::wav::{read_whisper_input, WHISPER_SAMPLE_RATE};
use crate::domain::{DomainError, RawTranscript, SegmentTranscript};
use crate::ports::{DecodeOptions, SpeechBackend, SpeechModel};

/// SpeechBackend implementation using whisper.cpp via whisper-rs.
pub struct WhisperCppBackend {
    threads: u32,
    use_gpu: bool,
}

impl WhisperCppBackend {
    /// Create a new WhisperCppBackend.
    ///
    /// The `threads` parameter specifies the number of threads to use.
    /// 0 means auto-detect (cores - 1).
    pub fn new(threads: u32, use_gpu: bool) -> Self {
        let actual_threads = resolve_threads(threads);

        info!(threads = actual_threads, use_gpu, "WhisperCppBackend created");

        Self {
            threads: actual_threads,
            use_gpu,
        }
    }
}

fn resolve_threads(threads: u32) -> u32 {
    if threads == 0 {
        std::thread::available_parallelism()
            .map(|p| std::cmp::max(1, p.get() as u32 - 1))
            .unwrap_or(1)
    } else {
        threads
    }
}

impl SpeechBackend for WhisperCppBackend {
    fn name(&self) -> &str {
        "whisper.cpp"
    }

    fn load(&self, path: &Path) -> Result<Box<dyn SpeechModel>, DomainError> {
        if !path.is_file() {
            return Err(DomainError::ModelNotFound(path.display().to_string()));
        }

        info!(path = ?path, "Loading whisper model");

        let path_str = path.to_string_lossy().to_string();
        let mut params = WhisperContextParameters::default();
        params.use_gpu(self.use_gpu);

        let context = WhisperContext::new_with_params(&path_str, params)
            .map_err(|e| DomainError::Engine(format!("Failed to load model: {}", e)))?;

        info!(path = ?path, "Whisper model loaded successfully");

        Ok(Box::new(WhisperCppModel {
            context,
            threads: self.threads,
        }))
    }
}

/// A loaded whisper.cpp context. Dropping it frees the model memory.
pub struct WhisperCppModel {
    context: WhisperContext,
    threads: u32,
}

impl WhisperCppModel {
    fn run(&self, samples: &[f32], options: &DecodeOptions) -> Result<RawTranscript, DomainError> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.threads as i32);
        params.set_language(Some(options.language.code()));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self
            .context
            .create_state()
            .map_err(|e| DomainError::Engine(format!("Failed to create whisper state: {}", e)))?;

        state
            .full(params, samples)
            .map_err(|e| DomainError::Engine(format!("Inference failed: {}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| DomainError::Engine(format!("Failed to get segment count: {}", e)))?;

        // Token ids at or above end-of-text are timestamps and control tokens.
        let eot = self.context.token_eot();

        let mut segments = Vec::with_capacity(num_segments.max(0) as usize);
        for i in 0..num_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| DomainError::Engine(format!("Failed to read segment {}: {}", i, e)))?;

            let n_tokens = state.full_n_tokens(i).unwrap_or(0);
            let mut sum = 0.0f64;
            let mut count = 0usize;
            for j in 0..n_tokens {
                if let Ok(token) = state.full_get_token_data(i, j) {
                    if token.id < eot {
                        sum += token.plog as f64;
                        count += 1;
                    }
                }
            }

            segments.push(SegmentTranscript {
                text,
                avg_logprob: (count > 0).then(|| sum / count as f64),
            });
        }

        Ok(RawTranscript::from_segments(segments))
    }
}

impl SpeechModel for WhisperCppModel {
    fn transcribe(&self, audio: &Path, options: &DecodeOptions) -> Result<RawTranscript, DomainError> {
        if !options.full_precision {
            warn!("Reduced precision requested; whisper.cpp decodes in f32 regardless");
        }

        let samples = read_whisper_input(audio)?;
        if samples.is_empty() {
            return Ok(RawTranscript::default());
        }

        debug!(
            samples = samples.len(),
            duration_secs = samples.len() as f32 / WHISPER_SAMPLE_RATE as f32,
            language = %options.language,
            "Starting transcription"
        );

        let start = std::time::Instant::now();
        let transcript = self.run(&samples, options)?;

        info!(
            text_len = transcript.text.len(),
            segments = transcript.segments.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Transcription complete"
        );

        Ok(transcript)
    }
}
