use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::model_manager::ModelManager;
use crate::app::queue::JobQueue;
use crate::domain::{AtomicServiceState, Command, DomainError, Job};
use crate::ports::EventSink;

/// What the serve loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

/// Parses inbound lines and routes commands to the queue or the model
/// manager.
///
/// | command        | effect                                 |
/// |----------------|----------------------------------------|
/// | `transcribe`   | enqueue a job                          |
/// | `switch_model` | load the model, awaited on this path   |
/// | `stop`         | stop, push the sentinel, shut down     |
///
/// Bad input is reported as one error event and otherwise ignored.
#[derive(Clone)]
pub struct CommandDispatcher {
    state: Arc<AtomicServiceState>,
    queue: JobQueue,
    models: Arc<ModelManager>,
    sink: Arc<dyn EventSink>,
}

impl CommandDispatcher {
    pub fn new(
        state: Arc<AtomicServiceState>,
        queue: JobQueue,
        models: Arc<ModelManager>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            state,
            queue,
            models,
            sink,
        }
    }

    /// Handle one raw inbound line. Blank lines are skipped.
    pub async fn handle_line(&self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }

        let result = match Command::parse(line) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(flow) => flow,
            Err(e) => {
                warn!(error = %e, "Command rejected");
                self.sink.error(&e.to_string());
                Flow::Continue
            }
        }
    }

    /// Execute a parsed command.
    pub async fn dispatch(&self, command: Command) -> Result<Flow, DomainError> {
        if !self.state.load().accepts_commands() {
            return Err(DomainError::ServiceStopped(command.name().to_string()));
        }

        match command {
            Command::Transcribe { audio_file, timestamp } => {
                debug!(audio = %audio_file.display(), queued = self.queue.len(), "Job queued");
                self.queue.enqueue(Job::new(audio_file, timestamp))?;
                Ok(Flow::Continue)
            }
            Command::SwitchModel { model } => {
                // The manager reports the outcome itself.
                if let Err(e) = self.models.load(&model).await {
                    debug!(error = %e, "Model switch failed");
                }
                Ok(Flow::Continue)
            }
            Command::Stop => {
                self.shutdown();
                Ok(Flow::Shutdown)
            }
        }
    }

    /// Stop accepting work and wake the worker. Idempotent.
    pub fn shutdown(&self) {
        if self.state.stop() {
            info!(queued = self.queue.len(), "Stopping service");
            self.queue.push_stop();
        }
    }
}
