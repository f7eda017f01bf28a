use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Port for locating model files.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Path of an installed model, or None if it is not available locally.
    fn locate(&self, model_name: &str) -> Option<PathBuf>;

    /// Make a model available locally and return its path.
    ///
    /// Fails with `ModelNotFound` when the model is unknown or fetching is
    /// disabled.
    async fn fetch(&self, model_name: &str) -> Result<PathBuf, DomainError>;
}
