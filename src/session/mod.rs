//! Session lifecycle
//!
//! ```text
//! Uninitialized ─► Acquiring ─► Running ◄─► Degraded
//!                      │           │           │
//!                      └───────► ShuttingDown ◄┘ ─► Stopped
//! ```
//!
//! [`SessionController`] owns the gamepad, the virtual pad and the input
//! state; [`run_session`] drives it until a stop request or a fatal failure.

pub mod controller;
pub mod error;

pub use controller::{
    run_session, SessionController, SessionPhase, SessionReport, SessionSettings, StopReason,
};
pub use error::SessionError;
