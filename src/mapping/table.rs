//! Physical button index → output action lookup
//!
//! The table is plain data: remapping a pad means editing the entries (or the
//! `[[mapping]]` section of the config file), never the normalizer.

use super::error::MappingError;
use super::mapping_types::{Action, LogicalButton, MappingEntry, TriggerSide};
use std::collections::HashMap;

/// Joy-Con (combined) to Xbox layout
const DEFAULT_ENTRIES: [MappingEntry; 17] = [
    MappingEntry::button(0, LogicalButton::A),
    MappingEntry::button(1, LogicalButton::B),
    MappingEntry::button(2, LogicalButton::X),
    MappingEntry::button(3, LogicalButton::Y),
    MappingEntry::button(4, LogicalButton::Back),
    MappingEntry::button(5, LogicalButton::Guide),
    MappingEntry::button(6, LogicalButton::Start),
    MappingEntry::button(7, LogicalButton::LeftThumb),
    MappingEntry::button(8, LogicalButton::RightThumb),
    MappingEntry::button(9, LogicalButton::LeftShoulder),
    MappingEntry::button(10, LogicalButton::RightShoulder),
    MappingEntry::button(11, LogicalButton::DPadUp),
    MappingEntry::button(12, LogicalButton::DPadDown),
    MappingEntry::button(13, LogicalButton::DPadLeft),
    MappingEntry::button(14, LogicalButton::DPadRight),
    MappingEntry::trigger(15, TriggerSide::Left),
    MappingEntry::trigger(16, TriggerSide::Right),
];

/// Immutable lookup table keyed by physical button index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<u16, Action>,
}

impl MappingTable {
    /// Builds a table, rejecting ambiguous bindings
    ///
    /// Every physical index may appear once, and every action (a logical
    /// button or a trigger side) may be driven by at most one physical index.
    pub fn from_entries<I>(entries: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        let mut by_index: HashMap<u16, Action> = HashMap::new();
        let mut by_action: HashMap<Action, u16> = HashMap::new();

        for entry in entries {
            if by_index.contains_key(&entry.index) {
                return Err(MappingError::DuplicateIndex(entry.index));
            }
            if let Some(&first) = by_action.get(&entry.action) {
                return Err(MappingError::DuplicateAction {
                    action: entry.action,
                    first,
                    second: entry.index,
                });
            }
            by_index.insert(entry.index, entry.action);
            by_action.insert(entry.action, entry.index);
        }

        Ok(Self { entries: by_index })
    }

    pub fn lookup(&self, index: u16) -> Option<Action> {
        self.entries.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per binding, ordered by physical index
    pub fn legend(&self) -> Vec<String> {
        let mut indices: Vec<&u16> = self.entries.keys().collect();
        indices.sort();
        indices
            .into_iter()
            .map(|index| format!("button {:>2} -> {}", index, self.entries[index]))
            .collect()
    }
}

impl Default for MappingTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENTRIES
                .iter()
                .map(|entry| (entry.index, entry.action))
                .collect(),
        }
    }
}
