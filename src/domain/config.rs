use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::DEFAULT_MODEL;

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable JSON file logging with daily rotation.
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
        }
    }
}

/// Model storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory holding ggml model files. None uses the platform data dir.
    pub dir: Option<PathBuf>,
    /// Model loaded at startup when none is given on the command line.
    pub default_model: String,
    /// Download catalogued models that are missing locally.
    pub auto_download: bool,
    /// Base URL the ggml files are fetched from.
    pub download_base_url: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            default_model: DEFAULT_MODEL.to_string(),
            auto_download: true,
            download_base_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main"
                .to_string(),
        }
    }
}

/// Transcription configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Number of inference threads (0 = auto).
    pub threads: u32,
    /// Let whisper.cpp use a GPU backend when one was compiled in.
    pub use_gpu: bool,
    /// How long the worker waits on an empty queue before re-checking
    /// for shutdown, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            use_gpu: true,
            poll_interval_ms: 1000,
        }
    }
}

/// Main worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkerConfig {
    pub logging: LoggingConfig,
    pub models: ModelsConfig,
    pub transcription: TranscriptionConfig,
}

impl WorkerConfig {
    /// Create a new WorkerConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::new();
        assert_eq!(config.models.default_model, "tiny.en");
        assert!(config.models.dir.is_none());
        assert_eq!(config.transcription.poll_interval_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: WorkerConfig = toml::from_str(
            r#"
            [models]
            default_model = "base"

            [transcription]
            threads = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.models.default_model, "base");
        assert!(config.models.auto_download);
        assert_eq!(config.transcription.threads, 4);
        assert!(config.transcription.use_gpu);
        assert!(!config.logging.file_logging);
    }
}
