use std::io::Write;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::domain::{DomainError, OutboundMessage};
use crate::ports::EventSink;

/// EventSink writing newline-delimited JSON to a shared stream.
///
/// Every event is written and flushed under one lock, so lines from the
/// dispatcher and the worker never interleave and appear in call order.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn write_line(&self, message: &OutboundMessage) -> Result<(), DomainError> {
        let line = message.to_line()?;
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink on the process's standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&self, message: OutboundMessage) {
        if let Err(e) = self.write_line(&message) {
            // The channel itself is broken, so the log is the only place left.
            error!(error = %e, ?message, "Failed to write outbound event");
            return;
        }
        debug!(kind = message_kind(&message), "Event emitted");
    }
}

fn message_kind(message: &OutboundMessage) -> &'static str {
    match message {
        OutboundMessage::Status { .. } => "status",
        OutboundMessage::Error { .. } => "error",
        OutboundMessage::Transcription(_) => "transcription",
    }
}
