use std::path::Path;

use crate::domain::{DomainError, LanguageHint, RawTranscript};

/// Per-call decoding options.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Fixed language for English-only models, auto-detect otherwise.
    pub language: LanguageHint,
    /// Request full-precision (non-reduced) arithmetic. Callers always set
    /// this so results do not depend on the execution backend.
    pub full_precision: bool,
}

impl DecodeOptions {
    /// Options for a model with the given language hint.
    pub fn for_language(language: LanguageHint) -> Self {
        Self {
            language,
            full_precision: true,
        }
    }
}

/// A model resident in memory and ready for inference.
///
/// Dropping the value releases every resource it holds.
pub trait SpeechModel: Send + Sync {
    /// Transcribe one audio artifact.
    fn transcribe(&self, audio: &Path, options: &DecodeOptions) -> Result<RawTranscript, DomainError>;
}

/// Port for the speech-to-text engine.
///
/// Implementations turn a model file into a [`SpeechModel`]. Loading is
/// blocking and may take seconds.
pub trait SpeechBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Load the model stored at `path`.
    fn load(&self, path: &Path) -> Result<Box<dyn SpeechModel>, DomainError>;
}
