use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info};

use crate::domain::{DomainError, LanguageHint, RawTranscript};
use crate::ports::{DecodeOptions, EventSink, ModelStore, SpeechBackend, SpeechModel};

/// The single resident model.
pub struct ModelHandle {
    name: String,
    language: LanguageHint,
    model: Box<dyn SpeechModel>,
}

impl ModelHandle {
    pub fn new(name: &str, model: Box<dyn SpeechModel>) -> Self {
        Self {
            name: name.to_string(),
            language: LanguageHint::for_model(name),
            model,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> LanguageHint {
        self.language
    }

    /// Run inference with this model's language hint at full precision.
    pub fn transcribe(&self, audio: &std::path::Path) -> Result<RawTranscript, DomainError> {
        let options = DecodeOptions::for_language(self.language);
        self.model.transcribe(audio, &options)
    }
}

/// Owns the active model and replaces it on request.
///
/// The worker holds the model slot for the whole of an inference call, so a
/// load waits for the in-flight job and never overlaps it. Loads are only
/// issued from the dispatcher, one at a time.
pub struct ModelManager {
    backend: Arc<dyn SpeechBackend>,
    store: Arc<dyn ModelStore>,
    sink: Arc<dyn EventSink>,
    active: Arc<Mutex<Option<ModelHandle>>>,
}

impl ModelManager {
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        store: Arc<dyn ModelStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            backend,
            store,
            sink,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the active model with `name`.
    ///
    /// The previous model is released before the new one is acquired. On
    /// failure no model is active until the next successful load. Emits a
    /// status with the load time on success, one error otherwise.
    pub async fn load(&self, name: &str) -> Result<(), DomainError> {
        self.sink.status(&format!("Loading model: {}", name));
        let start = Instant::now();

        match self.replace(name).await {
            Ok(()) => {
                let elapsed = start.elapsed().as_secs_f64();
                info!(model = name, elapsed_secs = elapsed, "Model active");
                self.sink
                    .status(&format!("Model {} loaded successfully in {:.2}s", name, elapsed));
                Ok(())
            }
            Err(e) => {
                let err = DomainError::ModelLoad {
                    name: name.to_string(),
                    reason: e.to_string(),
                };
                error!(error = %err, "Model load failed; no model is active");
                self.sink.error(&err.to_string());
                Err(err)
            }
        }
    }

    async fn replace(&self, name: &str) -> Result<(), DomainError> {
        let mut slot = Arc::clone(&self.active).lock_owned().await;

        if let Some(previous) = slot.take() {
            let previous_name = previous.name.clone();
            drop(previous);
            info!(model = %previous_name, "Released model");
        }

        let path = match self.store.locate(name) {
            Some(path) => path,
            None => self.store.fetch(name).await?,
        };

        info!(model = name, path = ?path, backend = self.backend.name(), "Loading model");

        let backend = Arc::clone(&self.backend);
        let model = tokio::task::spawn_blocking(move || backend.load(&path))
            .await
            .map_err(|e| DomainError::Worker(format!("Task join error: {}", e)))??;

        *slot = Some(ModelHandle::new(name, model));
        Ok(())
    }

    /// Release the active model, if any.
    pub async fn unload(&self) {
        if let Some(handle) = self.active.lock().await.take() {
            let name = handle.name.clone();
            drop(handle);
            info!(model = %name, "Model unloaded");
        }
    }

    /// Name of the active model.
    pub async fn active_model(&self) -> Option<String> {
        self.active.lock().await.as_ref().map(|h| h.name.clone())
    }

    /// Lock the model slot from a non-async thread. Held for the duration of
    /// an inference call.
    pub fn blocking_active(&self) -> MutexGuard<'_, Option<ModelHandle>> {
        self.active.blocking_lock()
    }
}
