use crate::controller::source::DeviceError;
use crate::output::sink::SinkError;

/// Failures that end a session
///
/// Only initialization failures and reconnect exhaustion end up here; a
/// transient poll or publish fault is handled inside the loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No gamepads found! Ensure the controller is paired and connected")]
    NoDevices,

    #[error("Gamepad {index} not found ({available} connected)")]
    DeviceNotFound { index: usize, available: usize },

    #[error("Gamepad error: {0}")]
    Device(#[from] DeviceError),

    #[error("Failed to initialize virtual controller: {0}")]
    SinkUnavailable(#[from] SinkError),

    #[error("Gamepad disconnected and no gamepad found after {attempts} reconnect attempt(s)")]
    ReconnectExhausted { attempts: u32 },
}

/// Per-tick fault, logged and then forgotten
#[derive(Debug, thiserror::Error)]
pub(crate) enum TickError {
    #[error("{0}")]
    Device(#[from] DeviceError),

    #[error("{0}")]
    Sink(#[from] SinkError),
}
