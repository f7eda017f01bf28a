use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DomainError, TranscriptionResult};

/// A validated inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Queue an audio artifact for transcription.
    Transcribe { audio_file: PathBuf, timestamp: Value },
    /// Replace the resident model.
    SwitchModel { model: String },
    /// Stop accepting work and shut down.
    Stop,
}

/// Wire shape of an inbound line before validation.
#[derive(Debug, Deserialize)]
struct RawCommand {
    command: Option<String>,
    audio_file: Option<PathBuf>,
    timestamp: Option<Value>,
    model: Option<String>,
}

impl Command {
    /// Parse and validate one inbound line.
    pub fn parse(line: &str) -> Result<Self, DomainError> {
        let raw: RawCommand = serde_json::from_str(line).map_err(|_| DomainError::MalformedCommand {
            line: line.to_string(),
        })?;

        let name = raw.command.ok_or_else(|| DomainError::MissingField {
            command: "<none>".to_string(),
            field: "command",
        })?;

        match name.as_str() {
            "transcribe" => {
                let audio_file = raw.audio_file.ok_or_else(|| missing(&name, "audio_file"))?;
                let timestamp = raw.timestamp.ok_or_else(|| missing(&name, "timestamp"))?;
                Ok(Command::Transcribe { audio_file, timestamp })
            }
            "switch_model" => {
                let model = raw.model.ok_or_else(|| missing(&name, "model"))?;
                Ok(Command::SwitchModel { model })
            }
            "stop" => Ok(Command::Stop),
            _ => Err(DomainError::UnknownCommand(name)),
        }
    }

    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Transcribe { .. } => "transcribe",
            Command::SwitchModel { .. } => "switch_model",
            Command::Stop => "stop",
        }
    }
}

fn missing(command: &str, field: &'static str) -> DomainError {
    DomainError::MissingField {
        command: command.to_string(),
        field,
    }
}

/// An outbound event. Receivers must dispatch on `type` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Status { message: String, timestamp: f64 },
    Error { message: String, timestamp: f64 },
    Transcription(TranscriptionResult),
}

impl OutboundMessage {
    pub fn status(message: impl Into<String>) -> Self {
        OutboundMessage::Status {
            message: message.into(),
            timestamp: unix_timestamp(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        OutboundMessage::Error {
            message: message.into(),
            timestamp: unix_timestamp(),
        }
    }

    /// Serialize to a single line (no trailing newline).
    pub fn to_line(&self) -> Result<String, DomainError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Seconds since the Unix epoch as a float.
pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
