//! Shared data types for the mapping table
//!
//! Defines the closed set of logical output buttons and the tagged action a
//! physical button index can be bound to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output buttons of the virtual pad
///
/// The set is closed: the output synchronizer walks [`LogicalButton::ALL`]
/// every tick, so adding a variant means adding it there as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalButton {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftThumb,
    RightThumb,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl LogicalButton {
    pub const ALL: [LogicalButton; 15] = [
        LogicalButton::A,
        LogicalButton::B,
        LogicalButton::X,
        LogicalButton::Y,
        LogicalButton::Back,
        LogicalButton::Guide,
        LogicalButton::Start,
        LogicalButton::LeftThumb,
        LogicalButton::RightThumb,
        LogicalButton::LeftShoulder,
        LogicalButton::RightShoulder,
        LogicalButton::DPadUp,
        LogicalButton::DPadDown,
        LogicalButton::DPadLeft,
        LogicalButton::DPadRight,
    ];
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalButton::A => "A",
            LogicalButton::B => "B",
            LogicalButton::X => "X",
            LogicalButton::Y => "Y",
            LogicalButton::Back => "Back",
            LogicalButton::Guide => "Guide",
            LogicalButton::Start => "Start",
            LogicalButton::LeftThumb => "Left Thumb",
            LogicalButton::RightThumb => "Right Thumb",
            LogicalButton::LeftShoulder => "LB",
            LogicalButton::RightShoulder => "RB",
            LogicalButton::DPadUp => "D-Pad Up",
            LogicalButton::DPadDown => "D-Pad Down",
            LogicalButton::DPadLeft => "D-Pad Left",
            LogicalButton::DPadRight => "D-Pad Right",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSide {
    Left,
    Right,
}

impl fmt::Display for TriggerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSide::Left => write!(f, "LT"),
            TriggerSide::Right => write!(f, "RT"),
        }
    }
}

/// What a physical button drives on the virtual pad
///
/// Triggers are analog on the output side; binding a digital button to one
/// synthesizes a full pull on press and a full release on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Button(LogicalButton),
    Trigger(TriggerSide),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Button(button) => write!(f, "{}", button),
            Action::Trigger(side) => write!(f, "{} (digital)", side),
        }
    }
}

/// A single row of the mapping table as it appears in the config file
///
/// ```toml
/// [[mapping]]
/// index = 15
/// action = { trigger = "left" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub index: u16,
    pub action: Action,
}

impl MappingEntry {
    pub const fn button(index: u16, button: LogicalButton) -> Self {
        Self {
            index,
            action: Action::Button(button),
        }
    }

    pub const fn trigger(index: u16, side: TriggerSide) -> Self {
        Self {
            index,
            action: Action::Trigger(side),
        }
    }
}
