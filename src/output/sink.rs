//! Virtual output sink abstraction
//!
//! A sink accepts normalized values and exposes them to the OS as a standard
//! gamepad. Setters only stage values; nothing reaches consumers until
//! [`VirtualSink::flush`] commits the batch.

use crate::mapping::{LogicalButton, TriggerSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("Virtual controller unavailable: {0}")]
    Unavailable(String),

    #[error("Insufficient privileges to create a virtual controller: {0}")]
    PermissionDenied(String),

    #[error("Failed to write to virtual controller: {0}")]
    WriteError(String),

    #[error("Virtual controller already released")]
    Closed,

    #[error("Virtual controllers are not supported on this platform")]
    Unsupported,
}

pub trait VirtualSink {
    /// Stages a stick position, both components in [-1.0, 1.0], "up" positive
    fn set_stick(&mut self, side: StickSide, x: f32, y: f32) -> Result<(), SinkError>;

    /// Stages a trigger value in [0.0, 1.0]
    fn set_trigger(&mut self, side: TriggerSide, value: f32) -> Result<(), SinkError>;

    fn set_button(&mut self, button: LogicalButton, pressed: bool) -> Result<(), SinkError>;

    /// Commits everything staged since the last flush in one update
    fn flush(&mut self) -> Result<(), SinkError>;

    /// Stages the all-neutral report; still needs a flush
    fn reset(&mut self) -> Result<(), SinkError>;

    /// Destroys the virtual device
    fn close(&mut self) -> Result<(), SinkError>;
}
