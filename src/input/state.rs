//! # Input State Accumulator
//!
//! Folds evdev events from every device into the latest known reading of each
//! input, and serves those readings to the control cycle through
//! [`RawInputSource`].
//!
//! ## Mapping
//!
//! | Device | Event | Reading |
//! |--------|-------|---------|
//! | Joystick | ABS (`axis_codes`) | axis normalized from `axis_min..axis_max` to `-1..1` |
//! | Joystick | KEY `BTN_TRIGGER + n` | button `n` (0-11) |
//! | Console | ABS (`pot_axis_codes`) | raw potentiometer value |
//! | Console | KEY (`digital_key_codes`) | digital input state |
//! | Console | ABS (`speed_limit_axis_code`) | knob, scaled to `0..max_volts` |
//! | Panel n | KEY `BTN_TRIGGER + n` | panel button `n` (0-11) |

use evdev::{EventType, InputEvent, Key};
use tracing::{debug, trace};

use super::device::DeviceRole;
use crate::config::Config;
use crate::teleop::input::{AxisTriple, ButtonState, RawInputSource, BUTTON_COUNT};

/// Which evdev codes feed which readings
#[derive(Debug, Clone, PartialEq)]
pub struct InputLayout {
    pub joystick_axis_codes: [u16; 3],
    pub joystick_axis_min: i32,
    pub joystick_axis_max: i32,
    pub pot_axis_codes: Vec<u16>,
    pub digital_key_codes: Vec<u16>,
    pub speed_limit_axis_code: u16,
    pub speed_limit_raw_min: i32,
    pub speed_limit_raw_max: i32,
    pub speed_limit_max_volts: f32,
    pub panel_count: usize,
}

impl InputLayout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            joystick_axis_codes: config.joystick.axis_codes,
            joystick_axis_min: config.joystick.axis_min,
            joystick_axis_max: config.joystick.axis_max,
            pot_axis_codes: config.console.pot_axis_codes.clone(),
            digital_key_codes: config.console.digital_key_codes.clone(),
            speed_limit_axis_code: config.console.speed_limit_axis_code,
            speed_limit_raw_min: config.console.speed_limit_raw_min,
            speed_limit_raw_max: config.console.speed_limit_raw_max,
            speed_limit_max_volts: config.drive.speed_limit_max_volts,
            panel_count: config.console.panel_device_paths.len(),
        }
    }
}

/// Latest reading of every input
#[derive(Debug, Clone)]
pub struct InputState {
    layout: InputLayout,
    joystick_axes: AxisTriple,
    joystick_buttons: ButtonState,
    panels: Vec<ButtonState>,
    pots: Vec<i32>,
    digital: Vec<bool>,
    speed_limit_raw: i32,
}

impl InputState {
    /// All inputs neutral. The speed-limit knob starts at its minimum, so nothing
    /// moves until the console reports a real setting.
    pub fn new(layout: InputLayout) -> Self {
        Self {
            joystick_axes: AxisTriple::ZERO,
            joystick_buttons: ButtonState::new(),
            panels: vec![ButtonState::new(); layout.panel_count],
            pots: vec![0; layout.pot_axis_codes.len()],
            digital: vec![false; layout.digital_key_codes.len()],
            speed_limit_raw: layout.speed_limit_raw_min,
            layout,
        }
    }

    pub fn layout(&self) -> &InputLayout {
        &self.layout
    }

    /// Apply one event from the device playing `role`
    pub fn process_event(&mut self, role: DeviceRole, event: &InputEvent) {
        let (code, value) = (event.code(), event.value());

        match event.event_type() {
            EventType::ABSOLUTE => self.process_axis(role, code, value),
            EventType::KEY => self.process_key(role, code, value != 0),
            _ => {
                // Ignore sync and misc events
            }
        }
    }

    fn process_axis(&mut self, role: DeviceRole, code: u16, value: i32) {
        match role {
            DeviceRole::Joystick => {
                let min = self.layout.joystick_axis_min;
                let max = self.layout.joystick_axis_max;
                let [x, y, z] = self.layout.joystick_axis_codes;
                let normalized = normalize_axis(value, min, max);
                if code == x {
                    self.joystick_axes.x = normalized;
                } else if code == y {
                    self.joystick_axes.y = normalized;
                } else if code == z {
                    self.joystick_axes.z = normalized;
                }
            }
            DeviceRole::Console => {
                if code == self.layout.speed_limit_axis_code {
                    self.speed_limit_raw = value;
                }
                if let Some(channel) = self.layout.pot_axis_codes.iter().position(|&c| c == code) {
                    self.pots[channel] = value;
                }
            }
            DeviceRole::Panel(_) => {}
        }
    }

    fn process_key(&mut self, role: DeviceRole, code: u16, pressed: bool) {
        match role {
            DeviceRole::Joystick => {
                if let Some(index) = button_index(code) {
                    self.joystick_buttons.set(index, pressed);
                }
            }
            DeviceRole::Console => {
                if let Some(channel) = self.layout.digital_key_codes.iter().position(|&c| c == code) {
                    trace!(channel, pressed, "digital input");
                    self.digital[channel] = pressed;
                }
            }
            DeviceRole::Panel(panel) => {
                if let (Some(index), Some(buttons)) = (button_index(code), self.panels.get_mut(panel)) {
                    buttons.set(index, pressed);
                }
            }
        }
    }

    /// Return everything read from `role` to neutral after the device goes away
    pub fn reset_role(&mut self, role: DeviceRole) {
        debug!("Resetting {} inputs", role);
        match role {
            DeviceRole::Joystick => {
                self.joystick_axes = AxisTriple::ZERO;
                self.joystick_buttons = ButtonState::new();
            }
            DeviceRole::Console => {
                self.pots.iter_mut().for_each(|p| *p = 0);
                self.digital.iter_mut().for_each(|d| *d = false);
                self.speed_limit_raw = self.layout.speed_limit_raw_min;
            }
            DeviceRole::Panel(panel) => {
                if let Some(buttons) = self.panels.get_mut(panel) {
                    *buttons = ButtonState::new();
                }
            }
        }
    }
}

/// `raw` in `min..=max` to `-1.0..=1.0`
fn normalize_axis(raw: i32, min: i32, max: i32) -> f32 {
    let span = (max - min) as f32;
    2.0 * (raw - min) as f32 / span - 1.0
}

/// Button number for a key code in the 12-code block starting at `BTN_TRIGGER`
fn button_index(code: u16) -> Option<usize> {
    let index = code.checked_sub(Key::BTN_TRIGGER.code())? as usize;
    (index < BUTTON_COUNT).then_some(index)
}

impl RawInputSource for InputState {
    fn joystick_axes(&mut self) -> AxisTriple {
        self.joystick_axes
    }

    fn joystick_buttons(&mut self) -> ButtonState {
        self.joystick_buttons
    }

    fn panel_buttons(&mut self, panel: usize) -> ButtonState {
        self.panels.get(panel).copied().unwrap_or_default()
    }

    fn pot_channel_count(&self) -> usize {
        self.pots.len()
    }

    fn pot_raw(&mut self, channel: usize) -> i32 {
        self.pots.get(channel).copied().unwrap_or(0)
    }

    fn digital_channel_count(&self) -> usize {
        self.digital.len()
    }

    fn digital_input(&mut self, channel: usize) -> bool {
        self.digital.get(channel).copied().unwrap_or(false)
    }

    fn speed_limit_volts(&mut self) -> f32 {
        let min = self.layout.speed_limit_raw_min;
        let max = self.layout.speed_limit_raw_max;
        (self.speed_limit_raw - min) as f32 / (max - min) as f32 * self.layout.speed_limit_max_volts
    }
}
