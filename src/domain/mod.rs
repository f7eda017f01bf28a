pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod state;
pub mod transcription;

pub use config::WorkerConfig;
pub use error::DomainError;
pub use model::{LanguageHint, ModelInfo};
pub use protocol::{Command, OutboundMessage};
pub use state::{AtomicServiceState, ServiceState};
pub use transcription::{Job, RawTranscript, SegmentTranscript, TranscriptionResult};
