//! Physical input source abstraction
//!
//! The session only ever talks to a gamepad through [`InputSource`]. The
//! production implementation is [`GilrsSource`](super::event_collector::GilrsSource);
//! tests drive the session with a scripted source instead.

use std::fmt;

/// Device event in the physical numbering of the source
///
/// Axis values are raw readings in the device convention: sticks report
/// "up" as negative, triggers travel from -1.0 (released) to 1.0 (pulled).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    ButtonDown(u16),
    ButtonUp(u16),
    AxisMotion(u8, f32),
}

/// Identity of an opened gamepad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to initialize input backend: {0}")]
    InitializationError(String),

    #[error("Gamepad {index} could not be opened: {reason}")]
    OpenError { index: usize, reason: String },

    #[error("No gamepad is open")]
    NotOpen,

    #[error("Failed to poll gamepad events: {0}")]
    PollError(String),
}

/// A source of gamepad events holding at most one open device handle
///
/// All calls are expected to return promptly; `poll` drains whatever is
/// pending and never waits for new input.
pub trait InputSource {
    /// Rescans and returns the number of connected gamepads
    fn enumerate(&mut self) -> usize;

    /// Opens the gamepad at `index`, replacing any previously opened one
    fn open(&mut self, index: usize) -> Result<DeviceInfo, DeviceError>;

    /// Appends every pending event of the opened gamepad to `events`
    fn poll(&mut self, events: &mut Vec<RawEvent>) -> Result<(), DeviceError>;

    /// Whether the opened gamepad is still connected
    fn is_initialized(&self) -> bool;

    /// Releases the opened gamepad
    fn close(&mut self) -> Result<(), DeviceError>;
}
