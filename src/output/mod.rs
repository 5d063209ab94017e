//! Output subsystem: virtual pad and per-tick synchronization
//!
//! ```text
//! InputState ──► OutputSynchronizer ──► VirtualSink (uinput Xbox 360 pad)
//! ```

pub mod sink;
pub mod synchronizer;
#[cfg(target_os = "linux")]
pub mod uinput;

pub use sink::{SinkError, StickSide, VirtualSink};
pub use synchronizer::{OutputSynchronizer, RateLimiter};

/// Creates the platform's virtual gamepad
#[cfg(target_os = "linux")]
pub fn open_virtual_pad(name: &str) -> Result<Box<dyn VirtualSink>, SinkError> {
    Ok(Box::new(uinput::UinputGamepad::open(name)?))
}

#[cfg(not(target_os = "linux"))]
pub fn open_virtual_pad(_name: &str) -> Result<Box<dyn VirtualSink>, SinkError> {
    Err(SinkError::Unsupported)
}
