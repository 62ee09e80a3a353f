//! # Mode Arbiter
//!
//! Decides each cycle which input device drives the platform and whether the
//! safety interlock forces a stop.
//!
//! Arbitration is level-triggered: it is a pure function of the signals sampled
//! this cycle. Holding the override selects the steering assembly; releasing it
//! returns to the joystick on the very next cycle.
//!
//! | Source        | Forced stop when                        |
//! |---------------|-----------------------------------------|
//! | Joystick      | joystick trigger button is held         |
//! | Potentiometer | steering safety trigger is NOT asserted |

use serde::Deserialize;

use super::input::RawInputSource;

/// Which device feeds the pipeline this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Joystick,
    Potentiometer,
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSource::Joystick => write!(f, "joystick"),
            InputSource::Potentiometer => write!(f, "potentiometer"),
        }
    }
}

/// A digital input channel with its active polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DigitalSignal {
    pub channel: usize,
    /// The signal is asserted when the line reads low.
    #[serde(default)]
    pub active_low: bool,
}

impl DigitalSignal {
    /// Reads the channel and applies polarity.
    pub fn asserted<I: RawInputSource + ?Sized>(&self, inputs: &mut I) -> bool {
        inputs.digital_input(self.channel) != self.active_low
    }
}

/// Where the source-select override is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideSource {
    /// A digital input on the operator console.
    Digital {
        channel: usize,
        #[serde(default)]
        active_low: bool,
    },
    /// A button on one of the auxiliary button panels.
    PanelButton { panel: usize, button: usize },
}

impl OverrideSource {
    pub fn asserted<I: RawInputSource + ?Sized>(&self, inputs: &mut I) -> bool {
        match *self {
            OverrideSource::Digital { channel, active_low } => {
                DigitalSignal { channel, active_low }.asserted(inputs)
            }
            OverrideSource::PanelButton { panel, button } => {
                inputs.panel_buttons(panel).pressed(button)
            }
        }
    }
}

/// Signals sampled this cycle that feed arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeSignals {
    pub override_asserted: bool,
    pub safety_trigger_asserted: bool,
    pub joystick_trigger_held: bool,
}

/// Result of arbitration for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbitration {
    pub source: InputSource,
    pub force_stop: bool,
}

/// Selects the input source and evaluates the interlock for that source.
///
/// # Examples
///
/// ```
/// use chairbot_teleop::teleop::arbiter::{arbitrate, InputSource, ModeSignals};
///
/// let result = arbitrate(&ModeSignals {
///     override_asserted: true,
///     safety_trigger_asserted: false,
///     joystick_trigger_held: false,
/// });
/// assert_eq!(result.source, InputSource::Potentiometer);
/// assert!(result.force_stop);
/// ```
#[must_use]
pub fn arbitrate(signals: &ModeSignals) -> Arbitration {
    let source = if signals.override_asserted {
        InputSource::Potentiometer
    } else {
        InputSource::Joystick
    };

    let force_stop = match source {
        InputSource::Joystick => signals.joystick_trigger_held,
        InputSource::Potentiometer => !signals.safety_trigger_asserted,
    };

    Arbitration { source, force_stop }
}
