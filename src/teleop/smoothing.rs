//! # Smoothing Filter
//!
//! A per-axis exponential moving average that keeps a mobility platform from
//! lurching when the operator jerks the stick.
//!
//! ```text
//! out = (prev * previous_weight + input * current_weight) / (previous_weight + current_weight)
//! ```
//!
//! With the default 49/1 weights, 98% of each output comes from history. A
//! bypass button passes the input straight through; the state still tracks
//! the output so re-enabling smoothing resumes from what was last commanded.

use serde::Deserialize;

use super::input::AxisTriple;

/// History and sample weights for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SmoothingWeights {
    #[serde(default = "default_previous_weight")]
    pub previous: f32,
    #[serde(default = "default_current_weight")]
    pub current: f32,
}

fn default_previous_weight() -> f32 { 49.0 }
fn default_current_weight() -> f32 { 1.0 }

impl Default for SmoothingWeights {
    fn default() -> Self {
        Self {
            previous: default_previous_weight(),
            current: default_current_weight(),
        }
    }
}

impl SmoothingWeights {
    #[inline]
    fn blend(&self, previous: f32, input: f32) -> f32 {
        (previous * self.previous + input * self.current) / (self.previous + self.current)
    }
}

/// Last commanded output, carried from one cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothingState(pub AxisTriple);

impl SmoothingState {
    /// Session-start state.
    pub const ZERO: SmoothingState = SmoothingState(AxisTriple::ZERO);

    #[must_use]
    pub fn value(&self) -> AxisTriple {
        self.0
    }
}

/// Per-axis EMA filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothingFilter {
    pub x: SmoothingWeights,
    pub y: SmoothingWeights,
    pub z: SmoothingWeights,
}

impl SmoothingFilter {
    /// Filters `input` against `previous` and returns the output together with
    /// the state for the next cycle. The new state is always the output.
    #[must_use]
    pub fn apply(
        &self,
        previous: SmoothingState,
        input: AxisTriple,
        bypass: bool,
    ) -> (AxisTriple, SmoothingState) {
        let output = if bypass {
            input
        } else {
            let prev = previous.value();
            AxisTriple {
                x: self.x.blend(prev.x, input.x),
                y: self.y.blend(prev.y, input.y),
                z: self.z.blend(prev.z, input.z),
            }
        };

        (output, SmoothingState(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = SmoothingWeights::default();
        assert_eq!(w.previous, 49.0);
        assert_eq!(w.current, 1.0);
    }

    #[test]
    fn test_first_step_from_zero() {
        let filter = SmoothingFilter::default();
        let (out, state) = filter.apply(SmoothingState::ZERO, AxisTriple::new(0.5, 0.5, 0.0), false);

        assert!((out.x - 0.01).abs() < 1e-6);
        assert!((out.y - 0.01).abs() < 1e-6);
        assert_eq!(out.z, 0.0);
        assert_eq!(state.value(), out);
    }

    #[test]
    fn test_converges_to_constant_input() {
        let filter = SmoothingFilter::default();
        let target = AxisTriple::new(-0.4, 0.8, 0.2);

        for start in [AxisTriple::ZERO, AxisTriple::new(1.0, -1.0, 1.0)] {
            let mut state = SmoothingState(start);
            let mut out = start;
            for _ in 0..3000 {
                (out, state) = filter.apply(state, target, false);
            }
            assert!((out.x - target.x).abs() < 1e-4);
            assert!((out.y - target.y).abs() < 1e-4);
            assert!((out.z - target.z).abs() < 1e-4);
        }
    }

    #[test]
    fn test_bypass_passes_input_and_updates_state() {
        let filter = SmoothingFilter::default();
        let input = AxisTriple::new(0.7, -0.2, 0.1);
        let (out, state) = filter.apply(SmoothingState::ZERO, input, true);

        assert_eq!(out, input);
        assert_eq!(state.value(), input);
    }

    #[test]
    fn test_resume_after_bypass_starts_from_last_output() {
        let filter = SmoothingFilter::default();
        let (_, state) = filter.apply(SmoothingState::ZERO, AxisTriple::new(1.0, 0.0, 0.0), true);
        let (out, _) = filter.apply(state, AxisTriple::ZERO, false);

        assert!((out.x - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_per_axis_weights() {
        let filter = SmoothingFilter {
            x: SmoothingWeights { previous: 0.0, current: 1.0 },
            y: SmoothingWeights { previous: 1.0, current: 1.0 },
            z: SmoothingWeights::default(),
        };
        let (out, _) = filter.apply(SmoothingState::ZERO, AxisTriple::new(0.6, 0.6, 0.5), false);

        assert!((out.x - 0.6).abs() < 1e-6);
        assert!((out.y - 0.3).abs() < 1e-6);
        assert!((out.z - 0.01).abs() < 1e-6);
    }
}
