use crate::mapping::{LogicalButton, TriggerSide};
use std::collections::HashSet;

// Normalized stick position, both components in [-1.0, 1.0]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StickPosition {
    pub x: f32,
    pub y: f32,
}

/// Snapshot of everything the virtual pad should currently report
///
/// Owned by the session. The normalizer writes it, the synchronizer reads it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pub left_stick: StickPosition,
    pub right_stick: StickPosition,
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub pressed_buttons: HashSet<LogicalButton>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: LogicalButton) {
        self.pressed_buttons.insert(button);
    }

    pub fn release(&mut self, button: LogicalButton) {
        self.pressed_buttons.remove(&button);
    }

    pub fn is_pressed(&self, button: LogicalButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    pub fn trigger(&self, side: TriggerSide) -> f32 {
        match side {
            TriggerSide::Left => self.left_trigger,
            TriggerSide::Right => self.right_trigger,
        }
    }

    pub fn set_trigger(&mut self, side: TriggerSide, value: f32) {
        match side {
            TriggerSide::Left => self.left_trigger = value,
            TriggerSide::Right => self.right_trigger = value,
        }
    }

    // Back to rest: centered sticks, released triggers, nothing held
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_neutral(&self) -> bool {
        self == &Self::default()
    }
}
