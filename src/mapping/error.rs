//! Error definitions for the mapping module

use super::mapping_types::Action;
use thiserror::Error;

/// Errors raised while building a mapping table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The same physical index appears in more than one entry
    #[error("Physical button {0} is mapped more than once")]
    DuplicateIndex(u16),

    /// Two physical buttons drive the same output
    #[error("{action} is bound to both physical button {first} and {second}")]
    DuplicateAction {
        action: Action,
        first: u16,
        second: u16,
    },
}
