//! Controller subsystem for gamepad input handling
//!
//! Implements the input half of the bridge:
//!
//! 1. [`event_collector`] - Raw gamepad input collection (gilrs)
//! 2. [`event_processor`] - Mapping and shaping into the [`InputState`]
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► InputSource ──► EventNormalizer ──► InputState
//!             (RawEvent)      (MappingTable)
//! ```

pub mod event_collector;
pub mod event_processor;
pub mod input_state;
pub mod shaping;
pub mod source;

pub use event_collector::GilrsSource;
pub use event_processor::EventNormalizer;
pub use input_state::{InputState, StickPosition};
pub use source::{DeviceError, DeviceInfo, InputSource, RawEvent};
