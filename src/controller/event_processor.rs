use crate::controller::input_state::InputState;
use crate::controller::shaping::{clamp_axis, rescale_trigger};
use crate::controller::source::RawEvent;
use crate::mapping::{Action, MappingTable, TriggerSide};
use tracing::debug;

// Fixed physical axis layout
const AXIS_LEFT_X: u8 = 0;
const AXIS_LEFT_Y: u8 = 1;
const AXIS_RIGHT_X: u8 = 2;
const AXIS_RIGHT_Y: u8 = 3;
const AXIS_LEFT_TRIGGER: u8 = 4;
const AXIS_RIGHT_TRIGGER: u8 = 5;

/// Turns raw device events into updates of the [`InputState`]
///
/// Button events go through the mapping table. Axis events use a fixed
/// layout: vertical stick axes are sign-inverted (the device reports "up" as
/// negative, the virtual pad expects "up" as positive) and trigger axes are
/// rescaled from [-1, 1] to [0, 1].
#[derive(Debug, Clone, Default)]
pub struct EventNormalizer {
    mapping: MappingTable,
}

impl EventNormalizer {
    pub fn new(mapping: MappingTable) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    pub fn apply(&self, state: &mut InputState, event: RawEvent) {
        match event {
            RawEvent::ButtonDown(index) => self.apply_button_event(state, index, true),
            RawEvent::ButtonUp(index) => self.apply_button_event(state, index, false),
            RawEvent::AxisMotion(axis, value) => self.apply_axis_event(state, axis, value),
        }
    }

    pub fn apply_button_event(&self, state: &mut InputState, index: u16, pressed: bool) {
        let Some(action) = self.mapping.lookup(index) else {
            debug!("Ignoring unmapped physical button {}", index);
            return;
        };

        match action {
            Action::Trigger(side) => {
                let value = if pressed { 1.0 } else { 0.0 };
                state.set_trigger(side, value);
                debug!(
                    "Trigger {} {} via button {}",
                    side,
                    if pressed { "ON" } else { "OFF" },
                    index
                );
            }
            Action::Button(button) => {
                if pressed {
                    state.press(button);
                    debug!("Button {} pressed: {}", index, button);
                } else {
                    state.release(button);
                    debug!("Button {} released: {}", index, button);
                }
            }
        }
    }

    pub fn apply_axis_event(&self, state: &mut InputState, axis: u8, raw_value: f32) {
        let value = clamp_axis(raw_value);

        match axis {
            AXIS_LEFT_X => state.left_stick.x = value,
            AXIS_LEFT_Y => state.left_stick.y = -value,
            AXIS_RIGHT_X => state.right_stick.x = value,
            AXIS_RIGHT_Y => state.right_stick.y = -value,
            AXIS_LEFT_TRIGGER => state.set_trigger(TriggerSide::Left, rescale_trigger(value)),
            AXIS_RIGHT_TRIGGER => state.set_trigger(TriggerSide::Right, rescale_trigger(value)),
            _ => {
                debug!("Dropping event for unknown axis {} ({:.4})", axis, raw_value);
            }
        }
    }
}
