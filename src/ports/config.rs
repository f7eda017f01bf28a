use std::path::PathBuf;

use crate::domain::{DomainError, WorkerConfig};

/// Configuration store port.
///
/// The worker only reads configuration; nothing is persisted across runs.
pub trait ConfigStore: Send + Sync {
    /// Load configuration. A missing file yields the defaults.
    fn load(&self) -> Result<WorkerConfig, DomainError>;

    /// Get the path to the configuration file.
    fn config_path(&self) -> PathBuf;

    /// Get the path to the application data directory.
    fn data_dir(&self) -> PathBuf;

    /// Get the path to the logs directory.
    fn logs_dir(&self) -> PathBuf;
}
