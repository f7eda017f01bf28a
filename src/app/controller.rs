use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{JsonLinesSink, LocalModelStore, TomlConfigStore, WhisperCppBackend};
use crate::app::service::TranscriptionService;
use crate::app::worker::WorkerStats;
use crate::domain::DomainError;
use crate::infrastructure::init_logging;
use crate::ports::ConfigStore;

/// Application controller that loads configuration, sets up logging and
/// wires the service to stdin and stdout.
pub struct AppController {
    initial_model: String,
    service: TranscriptionService,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize the controller. `model` overrides the configured default.
    pub fn new(model: Option<String>) -> Result<Self, DomainError> {
        let config_store = TomlConfigStore::new()?;
        let config = config_store.load()?;

        let log_guard = init_logging(
            &config_store.logs_dir(),
            &config.logging.level,
            config.logging.file_logging,
        )?;

        info!(config_path = ?config_store.config_path(), "Transcription worker starting up");

        let models_dir = config
            .models
            .dir
            .clone()
            .unwrap_or_else(|| config_store.default_models_dir());
        let store = LocalModelStore::new(models_dir, &config.models)?;
        let backend = WhisperCppBackend::new(
            config.transcription.threads,
            config.transcription.use_gpu,
        );

        let service = TranscriptionService::new(
            Arc::new(backend),
            Arc::new(store),
            Arc::new(JsonLinesSink::stdout()),
            Duration::from_millis(config.transcription.poll_interval_ms.max(1)),
        );

        let initial_model = model.unwrap_or_else(|| config.models.default_model.clone());

        Ok(Self {
            initial_model,
            service,
            _log_guard: log_guard,
        })
    }

    /// Serve stdin until stop, end of input or Ctrl-C.
    pub async fn serve(self) -> Result<WorkerStats, DomainError> {
        info!(model = %self.initial_model, "Serving commands on stdin");

        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        let stdin = BufReader::new(tokio::io::stdin());
        self.service
            .run(&self.initial_model, stdin, interrupt)
            .await
    }
}
