//! Linux uinput virtual Xbox 360 pad
//!
//! Presents itself with the Microsoft Xbox 360 wired vendor/product ids so
//! games and SDL pick up the standard layout without extra mapping.

use crate::mapping::{LogicalButton, TriggerSide};
use crate::output::sink::{SinkError, StickSide, VirtualSink};
use evdev::uinput::VirtualDevice;
use evdev::{
    AbsInfo, AbsoluteAxisCode, AttributeSet, BusType, EventType, InputEvent, InputId, KeyCode,
    UinputAbsSetup,
};
use std::io;
use tracing::{debug, info};

const STICK_MAX: i32 = 32767;
const TRIGGER_MAX: i32 = 255;

const XBOX_VENDOR_ID: u16 = 0x045e;
const XBOX_360_PRODUCT_ID: u16 = 0x028e;
const XBOX_360_VERSION: u16 = 0x0110;

pub struct UinputGamepad {
    device: Option<VirtualDevice>,
    pending: Vec<InputEvent>,
}

impl UinputGamepad {
    pub fn open(name: &str) -> Result<Self, SinkError> {
        info!("Creating virtual controller '{}'", name);
        let device = build_device(name).map_err(map_open_error)?;
        info!("Virtual Xbox controller initialized");

        Ok(Self {
            device: Some(device),
            pending: Vec::with_capacity(32),
        })
    }

    fn stage(&mut self, event: InputEvent) -> Result<(), SinkError> {
        if self.device.is_none() {
            return Err(SinkError::Closed);
        }
        self.pending.push(event);
        Ok(())
    }

    fn stage_abs(&mut self, axis: AbsoluteAxisCode, value: i32) -> Result<(), SinkError> {
        self.stage(InputEvent::new(EventType::ABSOLUTE.0, axis.0, value))
    }
}

impl VirtualSink for UinputGamepad {
    fn set_stick(&mut self, side: StickSide, x: f32, y: f32) -> Result<(), SinkError> {
        let (x_axis, y_axis) = match side {
            StickSide::Left => (AbsoluteAxisCode::ABS_X, AbsoluteAxisCode::ABS_Y),
            StickSide::Right => (AbsoluteAxisCode::ABS_RX, AbsoluteAxisCode::ABS_RY),
        };
        self.stage_abs(x_axis, stick_to_abs(x))?;
        // evdev reports "down" as positive
        self.stage_abs(y_axis, stick_to_abs(-y))
    }

    fn set_trigger(&mut self, side: TriggerSide, value: f32) -> Result<(), SinkError> {
        let axis = match side {
            TriggerSide::Left => AbsoluteAxisCode::ABS_Z,
            TriggerSide::Right => AbsoluteAxisCode::ABS_RZ,
        };
        self.stage_abs(axis, trigger_to_abs(value))
    }

    fn set_button(&mut self, button: LogicalButton, pressed: bool) -> Result<(), SinkError> {
        let key = button_code(button);
        self.stage(InputEvent::new(EventType::KEY.0, key.0, pressed as i32))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        let Some(device) = self.device.as_mut() else {
            return Err(SinkError::Closed);
        };
        if self.pending.is_empty() {
            return Ok(());
        }

        // emit() terminates the batch with a single SYN_REPORT
        let result = device.emit(&self.pending);
        debug!("Flushed {} events to virtual controller", self.pending.len());
        self.pending.clear();
        result.map_err(|e| SinkError::WriteError(e.to_string()))
    }

    fn reset(&mut self) -> Result<(), SinkError> {
        self.pending.clear();
        self.set_stick(StickSide::Left, 0.0, 0.0)?;
        self.set_stick(StickSide::Right, 0.0, 0.0)?;
        self.set_trigger(TriggerSide::Left, 0.0)?;
        self.set_trigger(TriggerSide::Right, 0.0)?;
        for button in LogicalButton::ALL {
            self.set_button(button, false)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.pending.clear();
        if self.device.take().is_some() {
            info!("Virtual controller released");
        }
        Ok(())
    }
}

fn build_device(name: &str) -> io::Result<VirtualDevice> {
    let stick_info = AbsInfo::new(0, -STICK_MAX - 1, STICK_MAX, 16, 128, 0);
    let trigger_info = AbsInfo::new(0, 0, TRIGGER_MAX, 0, 0, 0);

    let mut keys: AttributeSet<KeyCode> = AttributeSet::default();
    for button in LogicalButton::ALL {
        keys.insert(button_code(button));
    }

    VirtualDevice::builder()?
        .name(name)
        .input_id(InputId::new(
            BusType::BUS_USB,
            XBOX_VENDOR_ID,
            XBOX_360_PRODUCT_ID,
            XBOX_360_VERSION,
        ))
        .with_keys(&keys)?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_X, stick_info))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_Y, stick_info))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_RX, stick_info))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_RY, stick_info))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_Z, trigger_info))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_RZ, trigger_info))?
        .build()
}

fn map_open_error(e: io::Error) -> SinkError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => SinkError::PermissionDenied(format!(
            "{} (run as root or grant your user write access to /dev/uinput)",
            e
        )),
        io::ErrorKind::NotFound => {
            SinkError::Unavailable(format!("{} (is the uinput kernel module loaded?)", e))
        }
        _ => SinkError::Unavailable(e.to_string()),
    }
}

fn stick_to_abs(value: f32) -> i32 {
    (value.clamp(-1.0, 1.0) * STICK_MAX as f32).round() as i32
}

fn trigger_to_abs(value: f32) -> i32 {
    (value.clamp(0.0, 1.0) * TRIGGER_MAX as f32).round() as i32
}

// xpad layout: X/Y use the legacy BTN_X (north) / BTN_Y (west) codes
fn button_code(button: LogicalButton) -> KeyCode {
    match button {
        LogicalButton::A => KeyCode::BTN_SOUTH,
        LogicalButton::B => KeyCode::BTN_EAST,
        LogicalButton::X => KeyCode::BTN_NORTH,
        LogicalButton::Y => KeyCode::BTN_WEST,
        LogicalButton::Back => KeyCode::BTN_SELECT,
        LogicalButton::Guide => KeyCode::BTN_MODE,
        LogicalButton::Start => KeyCode::BTN_START,
        LogicalButton::LeftThumb => KeyCode::BTN_THUMBL,
        LogicalButton::RightThumb => KeyCode::BTN_THUMBR,
        LogicalButton::LeftShoulder => KeyCode::BTN_TL,
        LogicalButton::RightShoulder => KeyCode::BTN_TR,
        LogicalButton::DPadUp => KeyCode::BTN_DPAD_UP,
        LogicalButton::DPadDown => KeyCode::BTN_DPAD_DOWN,
        LogicalButton::DPadLeft => KeyCode::BTN_DPAD_LEFT,
        LogicalButton::DPadRight => KeyCode::BTN_DPAD_RIGHT,
    }
}
