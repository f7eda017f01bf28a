pub mod config_store;
pub mod json_lines;
pub mod model_store;
pub mod wav;
pub mod whisper_cpp;

pub use config_store::TomlConfigStore;
pub use json_lines::JsonLinesSink;
pub use model_store::LocalModelStore;
pub use whisper_cpp::WhisperCppBackend;
