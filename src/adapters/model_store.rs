use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::domain::config::ModelsConfig;
use crate::domain::model::{find_model, model_file_name};
use crate::domain::DomainError;
use crate::ports::ModelStore;

/// ModelStore backed by a directory of ggml files.
///
/// A model name resolves, in order, to an existing file at that literal
/// path, then to `<models_dir>/ggml-<name>.bin`. Catalogued models that are
/// missing are downloaded when `auto_download` is enabled.
pub struct LocalModelStore {
    models_dir: PathBuf,
    auto_download: bool,
    download_base_url: String,
    client: Client,
}

impl LocalModelStore {
    pub fn new(models_dir: PathBuf, config: &ModelsConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("transcription-worker/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::Http(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            models_dir = ?models_dir,
            auto_download = config.auto_download,
            "LocalModelStore initialized"
        );

        Ok(Self {
            models_dir,
            auto_download: config.auto_download,
            download_base_url: config.download_base_url.clone(),
            client,
        })
    }

    /// Path a model would be stored at.
    fn model_path(&self, model_name: &str) -> PathBuf {
        self.models_dir.join(model_file_name(model_name))
    }

    async fn download(&self, url: &str, path: &Path) -> Result<u64, DomainError> {
        let response = self
            .client
            .get(url)
            .timeout(std::time::Duration::from_secs(3600)) // 1 hour timeout for large models
            .send()
            .await
            .map_err(|e| DomainError::ModelDownload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::ModelDownload(format!("HTTP {} for {}", status, url)));
        }

        tokio::fs::create_dir_all(&self.models_dir).await?;

        // Write to temp file first, then rename atomically
        let temp_path = path.with_extension("download");
        let result = Self::stream_to_file(response, &temp_path).await;
        let downloaded = match result {
            Ok(n) => n,
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(DomainError::Io(e.to_string()));
        }

        Ok(downloaded)
    }

    async fn stream_to_file(response: reqwest::Response, path: &Path) -> Result<u64, DomainError> {
        let total_size = response.content_length().unwrap_or(0);
        let mut file = tokio::fs::File::create(path).await?;
        let mut downloaded: u64 = 0;
        let mut last_logged_pct = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DomainError::ModelDownload(e.to_string()))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if total_size > 0 {
                let pct = downloaded * 100 / total_size;
                if pct >= last_logged_pct + 10 {
                    last_logged_pct = pct;
                    debug!(downloaded, total_size, pct, "Model download progress");
                }
            }
        }

        file.flush().await?;
        Ok(downloaded)
    }
}

#[async_trait]
impl ModelStore for LocalModelStore {
    fn locate(&self, model_name: &str) -> Option<PathBuf> {
        let literal = Path::new(model_name);
        if literal.is_file() {
            return Some(literal.to_path_buf());
        }

        let path = self.model_path(model_name);
        path.is_file().then_some(path)
    }

    async fn fetch(&self, model_name: &str) -> Result<PathBuf, DomainError> {
        if let Some(path) = self.locate(model_name) {
            return Ok(path);
        }

        let info = find_model(model_name)
            .ok_or_else(|| DomainError::ModelNotFound(model_name.to_string()))?;

        if !self.auto_download {
            warn!(model = model_name, "Model not installed and auto_download is disabled");
            return Err(DomainError::ModelNotFound(format!(
                "{} (not installed in {})",
                model_name,
                self.models_dir.display()
            )));
        }

        let url = info.download_url(&self.download_base_url);
        let target = self.model_path(model_name);

        info!(
            model = model_name,
            size_mb = info.size_mb,
            url = %url,
            target = ?target,
            "Downloading model"
        );

        let size = self.download(&url, &target).await?;

        info!(model = model_name, size_mb = size / (1024 * 1024), "Model downloaded");
        Ok(target)
    }
}
