//! # Scaling Stage
//!
//! Applies the global power factor and the operator's speed-limit knob.

use super::input::AxisTriple;

/// Normalizes a speed-limit reading in volts to `0.0..=1.0`.
///
/// The reading is trusted to lie within `0..=max_volts`.
///
/// ```
/// use chairbot_teleop::teleop::scaling::normalize_speed_limit;
///
/// assert_eq!(normalize_speed_limit(5.0, 5.0), 1.0);
/// assert_eq!(normalize_speed_limit(2.5, 5.0), 0.5);
/// ```
#[inline]
#[must_use]
pub fn normalize_speed_limit(volts: f32, max_volts: f32) -> f32 {
    volts / max_volts
}

/// Scales deadzone-filtered intent by `power_factor * speed_limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingStage {
    power_factor: f32,
}

impl ScalingStage {
    #[must_use]
    pub fn new(power_factor: f32) -> Self {
        Self { power_factor }
    }

    #[must_use]
    pub fn power_factor(&self) -> f32 {
        self.power_factor
    }

    /// Multiplies every axis by the same combined factor.
    ///
    /// A speed limit of `0.0` yields exactly zero on every axis.
    #[must_use]
    pub fn apply(&self, input: AxisTriple, speed_limit: f32) -> AxisTriple {
        let factor = self.power_factor * speed_limit;
        if factor == 0.0 {
            return AxisTriple::ZERO;
        }
        input * factor
    }
}
