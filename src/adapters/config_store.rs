use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::{DomainError, WorkerConfig};
use crate::ports::ConfigStore;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TRANSCRIPTION_WORKER_CONFIG";

const APP_DIR: &str = "transcription-worker";

/// TOML-based configuration store with OS-specific paths.
pub struct TomlConfigStore {
    config_path: PathBuf,
    data_dir: PathBuf,
}

impl TomlConfigStore {
    /// Create a store using `$TRANSCRIPTION_WORKER_CONFIG` if set, otherwise
    /// the OS config directory.
    pub fn new() -> Result<Self, DomainError> {
        let config_path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => dirs::config_dir()
                .map(|p| p.join(APP_DIR).join("config.toml"))
                .ok_or_else(|| {
                    DomainError::Config("Could not find configuration directory".to_string())
                })?,
        };

        let data_dir = Self::get_data_dir()?;

        debug!(config_path = ?config_path, data_dir = ?data_dir, "ConfigStore initialized");

        Ok(Self {
            config_path,
            data_dir,
        })
    }

    /// Store reading a specific file, with data kept under `data_dir`.
    pub fn with_paths(config_path: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            config_path,
            data_dir,
        }
    }

    /// Get the OS-specific application data directory.
    /// - macOS: ~/Library/Application Support/transcription-worker/
    /// - Windows: %APPDATA%\transcription-worker\
    /// - Linux: ~/.local/share/transcription-worker/
    fn get_data_dir() -> Result<PathBuf, DomainError> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR))
            .ok_or_else(|| DomainError::Config("Could not find application data directory".to_string()))
    }

    /// Directory models are stored in unless the config names one.
    pub fn default_models_dir(&self) -> PathBuf {
        self.data_dir.join("models")
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<WorkerConfig, DomainError> {
        if self.config_path.exists() {
            debug!(path = ?self.config_path, "Loading configuration");
            let content = fs::read_to_string(&self.config_path)?;
            let config: WorkerConfig = toml::from_str(&content)?;
            info!(path = ?self.config_path, "Configuration loaded");
            Ok(config)
        } else {
            info!(path = ?self.config_path, "Configuration file not found, using defaults");
            Ok(WorkerConfig::new())
        }
    }

    fn config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
