use thiserror::Error;

/// Domain-level errors for the transcription worker.
///
/// None of these are fatal to the process: protocol errors are reported and
/// skipped, model load errors leave the worker without an active model, and
/// engine errors fail a single job.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Invalid JSON command: {line}")]
    MalformedCommand { line: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing required field '{field}' for command {command}")]
    MissingField {
        command: String,
        field: &'static str,
    },

    #[error("Service is stopped; ignoring {0} command")]
    ServiceStopped(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load model {name}: {reason}")]
    ModelLoad { name: String, reason: String },

    #[error("Model download failed: {0}")]
    ModelDownload(String),

    #[error("No model loaded; cannot transcribe {0}")]
    NoActiveModel(String),

    #[error("Audio file not found: {0}")]
    AudioNotFound(String),

    #[error("Audio decode error: {0}")]
    AudioDecode(String),

    #[error("Transcription error: {0}")]
    Engine(String),

    #[error("Failed to remove audio artifact {path}: {reason}")]
    Cleanup { path: String, reason: String },

    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
