//! # Deadzone Filter
//!
//! Removes the small "phantom" values a joystick or steering assembly reports
//! while the operator is not touching it.
//!
//! Values whose magnitude is at or below the threshold become exactly `0.0`.
//! Everything above passes through unchanged; there is no rescaling of the
//! remaining range, so the output jumps from `0.0` straight to the threshold.

use super::input::AxisTriple;

/// Zeroes `value` unless its magnitude strictly exceeds `threshold`.
///
/// # Examples
///
/// ```
/// use chairbot_teleop::teleop::deadzone::apply_deadzone;
///
/// assert_eq!(apply_deadzone(0.05, 0.06), 0.0);
/// assert_eq!(apply_deadzone(-0.06, 0.06), 0.0);
/// assert_eq!(apply_deadzone(0.07, 0.06), 0.07);
/// ```
#[inline]
#[must_use]
pub fn apply_deadzone(value: f32, threshold: f32) -> f32 {
    if value > threshold || value < -threshold {
        value
    } else {
        0.0
    }
}

/// Per-axis deadzone thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadzone {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Deadzone {
    /// Same threshold on all three axes.
    #[must_use]
    pub const fn uniform(threshold: f32) -> Self {
        Self {
            x: threshold,
            y: threshold,
            z: threshold,
        }
    }

    /// Filters each axis against its own threshold.
    #[must_use]
    pub fn apply(&self, input: AxisTriple) -> AxisTriple {
        AxisTriple {
            x: apply_deadzone(input.x, self.x),
            y: apply_deadzone(input.y, self.y),
            z: apply_deadzone(input.z, self.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_is_exactly_zero() {
        for m in [0.0, 0.001, 0.03, 0.0599] {
            assert_eq!(apply_deadzone(m, 0.06), 0.0);
            assert_eq!(apply_deadzone(-m, 0.06), 0.0);
        }
    }

    #[test]
    fn test_boundary_is_suppressed() {
        assert_eq!(apply_deadzone(0.06, 0.06), 0.0);
        assert_eq!(apply_deadzone(-0.06, 0.06), 0.0);
    }

    #[test]
    fn test_above_threshold_unchanged() {
        for m in [0.0601, 0.2, 0.75, 1.0, 1.4] {
            assert_eq!(apply_deadzone(m, 0.06), m);
            assert_eq!(apply_deadzone(-m, 0.06), -m);
        }
    }

    #[test]
    fn test_zero_threshold_passes_nonzero() {
        assert_eq!(apply_deadzone(0.0001, 0.0), 0.0001);
        assert_eq!(apply_deadzone(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_uniform_triple() {
        let dz = Deadzone::uniform(0.1);
        let out = dz.apply(AxisTriple::new(0.05, -0.5, 0.1));
        assert_eq!(out, AxisTriple::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_per_axis_thresholds() {
        let dz = Deadzone { x: 0.1, y: 0.2, z: 0.3 };
        let out = dz.apply(AxisTriple::new(0.15, 0.15, 0.15));
        assert_eq!(out, AxisTriple::new(0.15, 0.0, 0.0));
    }
}
