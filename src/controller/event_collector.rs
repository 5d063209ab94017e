use crate::controller::source::{DeviceError, DeviceInfo, InputSource, RawEvent};
use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, error, info, warn};

// gilrs backed input source
pub struct GilrsSource {
    // Gilrs context
    gilrs: Gilrs,

    // Opened gamepad
    active_gamepad: Option<GamepadId>,

    // Cleared when the opened gamepad reports a disconnect
    connected: bool,

    // Lowercase substrings expected in the gamepad name
    name_hints: Vec<String>,

    // Which triggers of the opened gamepad have reported analog travel
    triggers: AnalogTriggers,
}

impl GilrsSource {
    pub fn new(name_hints: Vec<String>) -> Result<Self, DeviceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(DeviceError::InitializationError(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            active_gamepad: None,
            connected: false,
            name_hints: name_hints.into_iter().map(|h| h.to_lowercase()).collect(),
            triggers: AnalogTriggers::default(),
        })
    }

    fn matches_hints(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name_hints.is_empty() || self.name_hints.iter().any(|hint| name.contains(hint))
    }

    // Convert gilrs event to the physical numbering of the mapping table
    fn convert_gilrs_event(&mut self, event: EventType) -> Option<RawEvent> {
        match event {
            EventType::AxisChanged(axis, value, _) => {
                debug!("Axis changed: {:?} = {:.4}", axis, value);
                match physical_axis(axis) {
                    Some((index, flip)) => {
                        let raw = if flip { -value } else { value };
                        Some(RawEvent::AxisMotion(index, raw))
                    }
                    None => {
                        debug!("Ignoring unsupported axis: {:?}", axis);
                        None
                    }
                }
            }
            EventType::ButtonPressed(button, _) if self.triggers.is_analog(button) => {
                debug!("Digital press of analog {:?} ignored", button);
                None
            }
            EventType::ButtonReleased(button, _) if self.triggers.is_analog(button) => {
                debug!("Digital release of analog {:?} ignored", button);
                None
            }
            EventType::ButtonChanged(button, value, _) => self.triggers.observe(button, value),
            EventType::ButtonPressed(button, _) => {
                debug!(
                    "Button pressed: {:?} at {}",
                    button,
                    Local::now().format("%H:%M:%S.%3f")
                );
                physical_button(button).map(RawEvent::ButtonDown)
            }
            EventType::ButtonReleased(button, _) => {
                debug!(
                    "Button released: {:?} at {}",
                    button,
                    Local::now().format("%H:%M:%S.%3f")
                );
                physical_button(button).map(RawEvent::ButtonUp)
            }
            EventType::ButtonRepeated(button, _) => {
                debug!("Button repeat ignored: {:?}", button);
                None
            }
            EventType::Connected => {
                info!("Controller connected event detected");
                None
            }
            EventType::Disconnected => {
                warn!("Controller disconnected event detected");
                self.connected = false;
                None
            }
            _ => {
                debug!("Unhandled event type: {:?}", event);
                None
            }
        }
    }
}

impl InputSource for GilrsSource {
    fn enumerate(&mut self) -> usize {
        if self.active_gamepad.is_none() {
            // Nobody drains the queue while no pad is open; pump it so
            // connects and disconnects are reflected in the gamepad list.
            while self.gilrs.next_event().is_some() {}
        }
        self.gilrs.gamepads().count()
    }

    fn open(&mut self, index: usize) -> Result<DeviceInfo, DeviceError> {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        info!("Found {} gamepad(s):", gamepads.len());
        for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
            info!(
                "  [{}] ID: {}, Name: {}, UUID: {:?}",
                idx,
                id,
                gamepad.name(),
                gamepad.uuid()
            );
        }

        let Some((id, gamepad)) = gamepads.get(index) else {
            return Err(DeviceError::OpenError {
                index,
                reason: format!("only {} gamepad(s) connected", gamepads.len()),
            });
        };

        let id = *id;
        let name = gamepad.name().to_string();
        if !self.matches_hints(&name) {
            warn!("Gamepad {} ({}) may not be a Joy-Con", index, name);
        }

        self.active_gamepad = Some(id);
        self.connected = true;
        self.triggers = AnalogTriggers::default();
        info!("Selected gamepad: {} ({})", name, id);

        Ok(DeviceInfo { index, name })
    }

    fn poll(&mut self, events: &mut Vec<RawEvent>) -> Result<(), DeviceError> {
        let Some(active_id) = self.active_gamepad else {
            return Err(DeviceError::NotOpen);
        };

        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if id != active_id {
                debug!("Skipping event from non-active gamepad: {:?}", id);
                continue;
            }
            if let Some(raw_event) = self.convert_gilrs_event(event) {
                events.push(raw_event);
            }
        }

        Ok(())
    }

    fn is_initialized(&self) -> bool {
        match self.active_gamepad {
            Some(id) => self.connected && self.gilrs.connected_gamepad(id).is_some(),
            None => false,
        }
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if let Some(id) = self.active_gamepad.take() {
            info!("Releasing gamepad {}", id);
        }
        self.connected = false;
        Ok(())
    }
}

// SDL game controller button order
fn physical_button(button: Button) -> Option<u16> {
    match button {
        Button::South => Some(0),
        Button::East => Some(1),
        Button::West => Some(2),
        Button::North => Some(3),
        Button::Select => Some(4),
        Button::Mode => Some(5),
        Button::Start => Some(6),
        Button::LeftThumb => Some(7),
        Button::RightThumb => Some(8),
        Button::LeftTrigger => Some(9),
        Button::RightTrigger => Some(10),
        Button::DPadUp => Some(11),
        Button::DPadDown => Some(12),
        Button::DPadLeft => Some(13),
        Button::DPadRight => Some(14),
        Button::LeftTrigger2 => Some(15),
        Button::RightTrigger2 => Some(16),
        _ => None,
    }
}

/// Translates gilrs trigger travel into trigger axis motion
///
/// Mapped pads report LT2/RT2 as `ButtonChanged` in [0, 1] next to the
/// usual pressed/released pair. A trigger becomes analog the first time it
/// reports a value strictly between the endpoints; from then on its travel
/// is forwarded as axis 4/5 in the device's [-1, 1] convention and its
/// digital press/release (physical 15/16) is dropped, so a threshold
/// crossing cannot snap it to a full pull. Digital triggers such as ZL/ZR
/// only ever report 0 or 1 and stay on the physical button binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AnalogTriggers {
    left: bool,
    right: bool,
}

impl AnalogTriggers {
    fn observe(&mut self, button: Button, value: f32) -> Option<RawEvent> {
        let (axis, analog) = match button {
            Button::LeftTrigger2 => (4, &mut self.left),
            Button::RightTrigger2 => (5, &mut self.right),
            _ => {
                debug!("Button value ignored: {:?} = {:.4}", button, value);
                return None;
            }
        };
        if value > 0.0 && value < 1.0 && !*analog {
            info!("{:?} reports analog travel", button);
            *analog = true;
        }
        if !*analog {
            return None;
        }
        Some(RawEvent::AxisMotion(axis, value * 2.0 - 1.0))
    }

    fn is_analog(&self, button: Button) -> bool {
        match button {
            Button::LeftTrigger2 => self.left,
            Button::RightTrigger2 => self.right,
            _ => false,
        }
    }
}

// gilrs reports stick Y with "up" positive; the physical convention is "up"
// negative, so vertical axes are flipped on the way in.
fn physical_axis(axis: Axis) -> Option<(u8, bool)> {
    match axis {
        Axis::LeftStickX => Some((0, false)),
        Axis::LeftStickY => Some((1, true)),
        Axis::RightStickX => Some((2, false)),
        Axis::RightStickY => Some((3, true)),
        Axis::LeftZ => Some((4, false)),
        Axis::RightZ => Some((5, false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::event_processor::EventNormalizer;
    use crate::controller::input_state::InputState;
    use crate::mapping::{Action, LogicalButton, MappingTable};

    #[test]
    fn face_buttons_follow_default_table() {
        let table = MappingTable::default();
        let lookup = |b| table.lookup(physical_button(b).unwrap());

        assert_eq!(lookup(Button::South), Some(Action::Button(LogicalButton::A)));
        assert_eq!(lookup(Button::North), Some(Action::Button(LogicalButton::Y)));
        assert_eq!(lookup(Button::Mode), Some(Action::Button(LogicalButton::Guide)));
    }

    #[test]
    fn stick_up_on_gilrs_stays_up_after_normalizing() {
        let normalizer = EventNormalizer::new(MappingTable::default());
        let mut state = InputState::new();

        let (index, flip) = physical_axis(Axis::LeftStickY).unwrap();
        let raw = if flip { -1.0 } else { 1.0 };
        normalizer.apply(&mut state, RawEvent::AxisMotion(index, raw));

        assert_eq!(state.left_stick.y, 1.0);
    }

    #[test]
    fn trigger_travel_becomes_trigger_axis() {
        let mut triggers = AnalogTriggers::default();

        assert_eq!(
            triggers.observe(Button::LeftTrigger2, 0.25),
            Some(RawEvent::AxisMotion(4, -0.5))
        );
        assert_eq!(
            triggers.observe(Button::LeftTrigger2, 0.0),
            Some(RawEvent::AxisMotion(4, -1.0))
        );
        assert_eq!(
            triggers.observe(Button::RightTrigger2, 0.75),
            Some(RawEvent::AxisMotion(5, 0.5))
        );
        assert_eq!(
            triggers.observe(Button::RightTrigger2, 1.0),
            Some(RawEvent::AxisMotion(5, 1.0))
        );
        assert_eq!(triggers.observe(Button::South, 0.5), None);
    }

    #[test]
    fn half_pulled_trigger_is_published_half_pulled() {
        let normalizer = EventNormalizer::new(MappingTable::default());
        let mut state = InputState::new();
        let mut triggers = AnalogTriggers::default();

        let event = triggers.observe(Button::RightTrigger2, 0.5).unwrap();
        normalizer.apply(&mut state, event);

        assert_eq!(state.right_trigger, 0.5);
    }

    #[test]
    fn digital_binding_yields_once_trigger_is_analog() {
        let mut triggers = AnalogTriggers::default();

        // Endpoint values alone keep the digital binding
        assert_eq!(triggers.observe(Button::LeftTrigger2, 1.0), None);
        assert_eq!(triggers.observe(Button::LeftTrigger2, 0.0), None);
        assert!(!triggers.is_analog(Button::LeftTrigger2));

        assert!(triggers.observe(Button::LeftTrigger2, 0.4).is_some());
        assert!(triggers.is_analog(Button::LeftTrigger2));
        assert!(!triggers.is_analog(Button::RightTrigger2));
        assert!(!triggers.is_analog(Button::South));
    }

    #[test]
    fn unsupported_inputs_have_no_index() {
        assert_eq!(physical_button(Button::C), None);
        assert_eq!(physical_axis(Axis::DPadX), None);
    }
}
