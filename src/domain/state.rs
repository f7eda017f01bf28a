use std::sync::atomic::{AtomicU8, Ordering};

/// Dispatcher state machine.
///
/// State transitions:
/// - Running -> Stopped (stop command, end of input, interrupt)
///
/// Stopped is terminal. The worker reads this state before every dequeue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServiceState {
    /// Accepting commands and processing jobs.
    Running = 0,
    /// No further commands accepted, no further jobs dequeued.
    Stopped = 1,
}

impl ServiceState {
    #[must_use]
    pub fn accepts_commands(&self) -> bool {
        matches!(self, ServiceState::Running)
    }
}

impl From<u8> for ServiceState {
    fn from(value: u8) -> Self {
        match value {
            0 => ServiceState::Running,
            _ => ServiceState::Stopped,
        }
    }
}

impl From<ServiceState> for u8 {
    fn from(state: ServiceState) -> Self {
        state as u8
    }
}

/// Atomic wrapper for ServiceState, shared by the dispatcher and the worker.
#[derive(Debug)]
pub struct AtomicServiceState(AtomicU8);

impl AtomicServiceState {
    pub fn new(state: ServiceState) -> Self {
        Self(AtomicU8::new(state.into()))
    }

    pub fn load(&self) -> ServiceState {
        self.0.load(Ordering::Acquire).into()
    }

    pub fn is_running(&self) -> bool {
        self.load() == ServiceState::Running
    }

    /// Move to Stopped. Returns true if this call performed the transition.
    pub fn stop(&self) -> bool {
        self.0
            .compare_exchange(
                ServiceState::Running.into(),
                ServiceState::Stopped.into(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for AtomicServiceState {
    fn default() -> Self {
        Self::new(ServiceState::Running)
    }
}
