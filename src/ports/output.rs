use crate::domain::OutboundMessage;

/// Port for outbound protocol events.
///
/// Shared by the dispatcher and the worker. Implementations must write each
/// event atomically and in call order.
pub trait EventSink: Send + Sync {
    /// Emit one event. Delivery failures are handled by the implementation.
    fn emit(&self, message: OutboundMessage);

    fn status(&self, message: &str) {
        self.emit(OutboundMessage::status(message));
    }

    fn error(&self, message: &str) {
        self.emit(OutboundMessage::error(message));
    }
}
