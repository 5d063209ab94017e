//! Mapping of physical button indices to virtual pad outputs.
//!
//! The table is static for the lifetime of a session. Lookups are constant
//! time, unmapped indices resolve to `None` and are ignored by the normalizer.

pub mod error;
pub mod mapping_types;
pub mod table;

pub use error::MappingError;
pub use mapping_types::{Action, LogicalButton, MappingEntry, TriggerSide};
pub use table::MappingTable;
