use std::future::Future;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

use crate::app::dispatcher::{CommandDispatcher, Flow};
use crate::app::model_manager::ModelManager;
use crate::app::queue::JobQueue;
use crate::app::worker::{Worker, WorkerStats};
use crate::domain::{AtomicServiceState, DomainError};
use crate::ports::{EventSink, ModelStore, SpeechBackend};

/// The wired-up worker process: one dispatcher, one queue, one worker
/// thread and one model manager sharing a single output channel.
pub struct TranscriptionService {
    sink: Arc<dyn EventSink>,
    models: Arc<ModelManager>,
    queue: JobQueue,
    state: Arc<AtomicServiceState>,
    poll_interval: Duration,
}

impl TranscriptionService {
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        store: Arc<dyn ModelStore>,
        sink: Arc<dyn EventSink>,
        poll_interval: Duration,
    ) -> Self {
        let models = Arc::new(ModelManager::new(backend, store, Arc::clone(&sink)));
        Self {
            sink,
            models,
            queue: JobQueue::new(),
            state: Arc::new(AtomicServiceState::default()),
            poll_interval,
        }
    }

    pub fn dispatcher(&self) -> CommandDispatcher {
        CommandDispatcher::new(
            Arc::clone(&self.state),
            self.queue.clone(),
            Arc::clone(&self.models),
            Arc::clone(&self.sink),
        )
    }

    fn worker(&self) -> Worker {
        Worker::new(
            self.queue.clone(),
            Arc::clone(&self.models),
            Arc::clone(&self.sink),
            Arc::clone(&self.state),
            self.poll_interval,
        )
    }

    /// Load `initial_model`, then serve commands from `input` until `stop`,
    /// end of input, a read error or `interrupt` resolves.
    ///
    /// Always ends by joining the worker, releasing the model and emitting
    /// a final `Service stopped` status.
    pub async fn run<R, F>(self, initial_model: &str, input: R, interrupt: F) -> Result<WorkerStats, DomainError>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let worker = self.worker().spawn()?;

        if self.models.load(initial_model).await.is_ok() {
            self.sink.status(&format!(
                "Transcription service initialized with model: {}",
                initial_model
            ));
        } else {
            self.sink
                .status("Transcription service initialized without an active model");
        }

        let dispatcher = self.dispatcher();
        let mut lines = input.lines();
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if dispatcher.handle_line(&line).await == Flow::Shutdown {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Input closed; shutting down");
                        dispatcher.shutdown();
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to read input");
                        self.sink.error(&format!("Service error: {}", e));
                        dispatcher.shutdown();
                        break;
                    }
                },
                _ = &mut interrupt => {
                    info!("Interrupted");
                    self.sink.status("Service interrupted");
                    dispatcher.shutdown();
                    break;
                }
            }
        }

        self.finish(worker).await
    }

    async fn finish(&self, worker: JoinHandle<WorkerStats>) -> Result<WorkerStats, DomainError> {
        let joined = tokio::task::spawn_blocking(move || worker.join())
            .await
            .map_err(|e| DomainError::Worker(format!("Task join error: {}", e)))?;

        self.models.unload().await;
        self.sink.status("Service stopped");

        let stats = joined.map_err(|_| DomainError::Worker("Worker thread panicked".to_string()))?;
        info!(?stats, "Service stopped");
        Ok(stats)
    }
}
