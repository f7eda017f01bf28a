pub mod controller;
pub mod dispatcher;
pub mod model_manager;
pub mod queue;
pub mod service;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::AppController;
pub use dispatcher::{CommandDispatcher, Flow};
pub use model_manager::{ModelHandle, ModelManager};
pub use queue::JobQueue;
pub use service::TranscriptionService;
pub use worker::{Worker, WorkerStats};
