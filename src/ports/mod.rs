pub mod config;
pub mod model_store;
pub mod output;
pub mod transcriber;

pub use config::ConfigStore;
pub use model_store::ModelStore;
pub use output::EventSink;
pub use transcriber::{DecodeOptions, SpeechBackend, SpeechModel};
