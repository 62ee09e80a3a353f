//! # Potentiometer Normalizer
//!
//! Converts raw steering-assembly readings into signed deflection relative to
//! the neutral position captured when the session started.
//!
//! The output is deliberately NOT clamped: a reading beyond the configured
//! range yields a magnitude above `1.0`, which makes a bad calibration visible
//! as overdrive instead of hiding it.
//!
//! ```
//! use chairbot_teleop::teleop::potentiometer::{CalibrationBaseline, PotNormalizer};
//!
//! let pot = PotNormalizer::new(0, 1000, 20);
//! let baseline = CalibrationBaseline { x: 500, y: 480 };
//!
//! assert_eq!(pot.normalize(510, baseline.x), 0.0); // inside raw deadzone
//! assert_eq!(pot.normalize(1000, baseline.x), 1.0);
//! assert_eq!(pot.normalize(1100, baseline.x), 1.2); // miscalibrated, unclamped
//! ```

use tracing::debug;

use super::input::{AxisTriple, RawInputSource};

/// Neutral potentiometer readings captured at session start.
///
/// Only [`TeleopSession::start`](super::pipeline::TeleopSession::start) creates
/// one; it is never refreshed mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationBaseline {
    /// Neutral reading of the lateral potentiometer.
    pub x: i32,
    /// Neutral reading of the forward potentiometer.
    pub y: i32,
}

impl CalibrationBaseline {
    /// Samples the two steering channels as the new neutral position.
    pub fn capture<I: RawInputSource + ?Sized>(
        inputs: &mut I,
        x_channel: usize,
        y_channel: usize,
    ) -> Self {
        let baseline = Self {
            x: inputs.pot_raw(x_channel),
            y: inputs.pot_raw(y_channel),
        };
        debug!("Captured potentiometer baseline: x={}, y={}", baseline.x, baseline.y);
        baseline
    }
}

/// Maps raw readings to signed deflection around a baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotNormalizer {
    range_min: i32,
    range_max: i32,
    deadzone_raw: i32,
}

impl PotNormalizer {
    /// # Arguments
    ///
    /// * `range_min` / `range_max` - Raw travel of the potentiometer (`range_min < range_max`)
    /// * `deadzone_raw` - Raw distance from the baseline treated as neutral
    #[must_use]
    pub fn new(range_min: i32, range_max: i32, deadzone_raw: i32) -> Self {
        Self {
            range_min,
            range_max,
            deadzone_raw: deadzone_raw.max(0),
        }
    }

    /// Returns `2 * (raw - baseline) / (range_max - range_min)`, or `0.0`
    /// when `|raw - baseline| < deadzone_raw`.
    #[must_use]
    pub fn normalize(&self, raw: i32, baseline: i32) -> f32 {
        let delta = raw - baseline;
        if delta.abs() < self.deadzone_raw {
            return 0.0;
        }

        let span = (self.range_max - self.range_min) as f32;
        2.0 * delta as f32 / span
    }

    /// Reads both steering channels and produces the potentiometer triple.
    ///
    /// The steering assembly has no rotation channel, so `z` is always zero.
    pub fn read<I: RawInputSource + ?Sized>(
        &self,
        inputs: &mut I,
        baseline: &CalibrationBaseline,
        x_channel: usize,
        y_channel: usize,
    ) -> AxisTriple {
        AxisTriple {
            x: self.normalize(inputs.pot_raw(x_channel), baseline.x),
            y: self.normalize(inputs.pot_raw(y_channel), baseline.y),
            z: 0.0,
        }
    }
}
