use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One queued transcription request.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Transient audio artifact; removed once the job has been processed.
    pub audio_file: PathBuf,
    /// Caller-supplied timestamp, passed through untouched.
    pub submitted_at: Value,
}

impl Job {
    pub fn new(audio_file: impl Into<PathBuf>, submitted_at: Value) -> Self {
        Self {
            audio_file: audio_file.into(),
            submitted_at,
        }
    }
}

/// One decoded segment as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTranscript {
    pub text: String,
    /// Average token log-probability, when the engine can supply one.
    pub avg_logprob: Option<f64>,
}

/// Raw engine output for one audio artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTranscript {
    pub text: String,
    pub segments: Vec<SegmentTranscript>,
}

impl RawTranscript {
    /// Build a transcript from segments, joining their text.
    pub fn from_segments(segments: Vec<SegmentTranscript>) -> Self {
        let text = segments.iter().map(|s| s.text.as_str()).collect::<String>();
        Self { text, segments }
    }

    /// Overall confidence of this transcript. See [`overall_confidence`].
    pub fn confidence(&self) -> f64 {
        overall_confidence(self.segments.iter().filter_map(|s| s.avg_logprob))
    }
}

/// Result emitted for a job that produced text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Trimmed, never empty.
    pub text: String,
    /// Copied from the originating job.
    pub timestamp: Value,
    pub confidence: f64,
    /// Wall-clock seconds spent on the job.
    pub processing_time: f64,
    pub model: String,
}

/// Map a segment's average log-probability onto `[0, 1]`.
///
/// This is a linear squash of the log-probability, not a calibrated
/// probability: `-1.0` and below map to `0.0`, `1.0` and above to `1.0`.
pub fn segment_confidence(avg_logprob: f64) -> f64 {
    ((avg_logprob + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Mean of the per-segment confidences, or `0.0` when no segment has a
/// usable log-probability. NaN values are skipped.
pub fn overall_confidence(avg_logprobs: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = avg_logprobs
        .into_iter()
        .filter(|p| !p.is_nan())
        .map(segment_confidence)
        .fold((0.0, 0usize), |(sum, count), c| (sum + c, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_confidence_in_range() {
        for i in -10..=10 {
            let p = i as f64 / 10.0;
            let c = segment_confidence(p);
            assert!((0.0..=1.0).contains(&c), "p={} gave {}", p, c);
        }
        assert_eq!(segment_confidence(-1.0), 0.0);
        assert_eq!(segment_confidence(0.0), 0.5);
        assert_eq!(segment_confidence(1.0), 1.0);
    }

    #[test]
    fn test_segment_confidence_clamps_out_of_range() {
        assert_eq!(segment_confidence(-5.0), 0.0);
        assert_eq!(segment_confidence(3.0), 1.0);
        assert_eq!(segment_confidence(f64::NEG_INFINITY), 0.0);
        assert_eq!(segment_confidence(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_overall_confidence_mean() {
        let c = overall_confidence([-0.5, 0.5]);
        assert!((c - 0.5).abs() < 1e-12);

        let c = overall_confidence([-0.2]);
        assert!((c - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_overall_confidence_empty() {
        assert_eq!(overall_confidence(Vec::new()), 0.0);
        assert_eq!(overall_confidence([f64::NAN]), 0.0);
    }

    #[test]
    fn test_transcript_skips_segments_without_logprob() {
        let transcript = RawTranscript::from_segments(vec![
            SegmentTranscript { text: " Hello".to_string(), avg_logprob: Some(0.0) },
            SegmentTranscript { text: " world".to_string(), avg_logprob: None },
        ]);
        assert_eq!(transcript.text, " Hello world");
        assert!((transcript.confidence() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_result_serialization_fields() {
        let result = TranscriptionResult {
            text: "hi".to_string(),
            timestamp: serde_json::json!(1700000000000u64),
            confidence: 0.75,
            processing_time: 0.2,
            model: "tiny.en".to_string(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["processing_time"], 0.2);
        assert_eq!(value["timestamp"], 1700000000000u64);
        assert_eq!(value["model"], "tiny.en");
    }
}
