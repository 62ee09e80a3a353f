//! # Raw Input Types
//!
//! Value types sampled from the operator's input devices every cycle, and the
//! [`RawInputSource`] trait the control loop reads them through.
//!
//! Nothing here is retained across cycles: every call on a [`RawInputSource`]
//! is a fresh sensor read.

use std::ops::Mul;

/// Number of buttons on a joystick or auxiliary button panel.
pub const BUTTON_COUNT: usize = 12;

/// Characters used to render a pressed button in a status bitmap.
const BUTTON_GLYPHS: [char; BUTTON_COUNT] =
    ['1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c'];

/// Lateral, forward and rotational intent.
///
/// Each component is nominally in `-1.0..=1.0`. Potentiometer-derived values
/// may exceed that range when the steering assembly is miscalibrated.
///
/// # Examples
///
/// ```
/// use chairbot_teleop::teleop::input::AxisTriple;
///
/// let t = AxisTriple::new(0.5, -0.25, 0.0) * 2.0;
/// assert_eq!(t, AxisTriple::new(1.0, -0.5, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisTriple {
    /// Lateral (strafe) intent.
    pub x: f32,
    /// Forward intent.
    pub y: f32,
    /// Rotational intent.
    pub z: f32,
}

impl AxisTriple {
    /// All axes at rest.
    pub const ZERO: AxisTriple = AxisTriple { x: 0.0, y: 0.0, z: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Applies `f` to each component.
    #[must_use]
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self {
            x: f(self.x),
            y: f(self.y),
            z: f(self.z),
        }
    }

    /// Returns true when every component is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl Mul<f32> for AxisTriple {
    type Output = AxisTriple;

    fn mul(self, factor: f32) -> AxisTriple {
        self.map(|v| v * factor)
    }
}

/// Pressed/released flags for the 12 buttons of one device, indexed 0-11.
///
/// # Examples
///
/// ```
/// use chairbot_teleop::teleop::input::ButtonState;
///
/// let buttons = ButtonState::from_bits(0b1000_0000_0001);
/// assert!(buttons.pressed(0));
/// assert!(buttons.pressed(11));
/// assert!(!buttons.pressed(5));
/// assert_eq!(buttons.bitmap(), "1c");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    buttons: [bool; BUTTON_COUNT],
}

impl ButtonState {
    /// All buttons released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from a bitmask where bit `i` is button `i`.
    #[must_use]
    pub fn from_bits(bits: u16) -> Self {
        let mut buttons = [false; BUTTON_COUNT];
        for (i, pressed) in buttons.iter_mut().enumerate() {
            *pressed = (bits >> i) & 1 == 1;
        }
        Self { buttons }
    }

    /// Returns the state as a bitmask where bit `i` is button `i`.
    #[must_use]
    pub fn bits(&self) -> u16 {
        self.buttons
            .iter()
            .enumerate()
            .filter(|(_, &pressed)| pressed)
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }

    /// Whether button `index` is held. Out-of-range indices read as released.
    #[must_use]
    pub fn pressed(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Sets button `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, pressed: bool) {
        if let Some(slot) = self.buttons.get_mut(index) {
            *slot = pressed;
        }
    }

    /// Renders pressed buttons as `1`-`9`, `a`, `b`, `c`, skipping released ones.
    #[must_use]
    pub fn bitmap(&self) -> String {
        self.buttons
            .iter()
            .zip(BUTTON_GLYPHS)
            .filter(|(&pressed, _)| pressed)
            .map(|(_, glyph)| glyph)
            .collect()
    }
}

/// Side-effecting sensor reads consumed by the control loop.
///
/// Implementations must not block. The loop re-reads at each point of use and
/// tolerates values changing between two reads in the same cycle.
#[cfg_attr(test, mockall::automock)]
pub trait RawInputSource {
    /// Joystick analog axes, each nominally `-1.0..=1.0`.
    fn joystick_axes(&mut self) -> AxisTriple;

    /// Joystick button panel.
    fn joystick_buttons(&mut self) -> ButtonState;

    /// Buttons of auxiliary panel `panel`. Unknown panels read as all released.
    fn panel_buttons(&mut self, panel: usize) -> ButtonState;

    /// Number of potentiometer channels available.
    fn pot_channel_count(&self) -> usize;

    /// Raw reading of potentiometer `channel`.
    fn pot_raw(&mut self, channel: usize) -> i32;

    /// Number of digital input channels available.
    fn digital_channel_count(&self) -> usize;

    /// Raw electrical state of digital input `channel`.
    fn digital_input(&mut self, channel: usize) -> bool;

    /// Speed-limit knob in volts (`0.0..=max_volts`).
    fn speed_limit_volts(&mut self) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_triple_zero() {
        assert!(AxisTriple::ZERO.is_zero());
        assert!(AxisTriple::default().is_zero());
        assert!(!AxisTriple::new(0.0, 0.1, 0.0).is_zero());
    }

    #[test]
    fn test_axis_triple_scale() {
        let t = AxisTriple::new(0.5, -0.5, 1.0) * 0.5;
        assert_eq!(t, AxisTriple::new(0.25, -0.25, 0.5));
    }

    #[test]
    fn test_axis_triple_map() {
        let t = AxisTriple::new(-0.3, 0.2, 0.9).map(f32::abs);
        assert_eq!(t, AxisTriple::new(0.3, 0.2, 0.9));
    }

    #[test]
    fn test_button_state_default_released() {
        let buttons = ButtonState::new();
        for i in 0..BUTTON_COUNT {
            assert!(!buttons.pressed(i));
        }
        assert_eq!(buttons.bits(), 0);
        assert_eq!(buttons.bitmap(), "");
    }

    #[test]
    fn test_button_state_bits() {
        let buttons = ButtonState::from_bits(0x0C05);
        assert_eq!(buttons.bits(), 0x0C05);
        assert!(buttons.pressed(0));
        assert!(buttons.pressed(2));
        assert!(buttons.pressed(10));
        assert!(buttons.pressed(11));
    }

    #[test]
    fn test_button_state_ignores_high_bits() {
        let buttons = ButtonState::from_bits(0xF000);
        assert_eq!(buttons.bits(), 0);
    }

    #[test]
    fn test_button_state_out_of_range() {
        let mut buttons = ButtonState::new();
        buttons.set(12, true);
        assert!(!buttons.pressed(12));
        assert_eq!(buttons.bits(), 0);
    }

    #[test]
    fn test_button_bitmap_all_pressed() {
        let buttons = ButtonState::from_bits(0x0FFF);
        assert_eq!(buttons.bitmap(), "123456789abc");
    }

    #[test]
    fn test_button_bitmap_partial() {
        let mut buttons = ButtonState::new();
        buttons.set(1, true);
        buttons.set(9, true);
        assert_eq!(buttons.bitmap(), "2a");
    }
}
