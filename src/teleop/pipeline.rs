//! # Control Cycle
//!
//! One parameterized pipeline run once per control tick:
//!
//! ```text
//! inputs ─► ModeArbiter ─┬─ forceStop ──────────────────────────────► STOP
//!                        └─ joystick | potentiometer triple
//!                              ─► Deadzone ─► Scaling ─► Smoothing ─► DriveCommand
//! ```
//!
//! [`run_cycle`] is a pure function of the parameters, the session baseline,
//! the previous smoothing state and whatever the input source reports. The
//! only state carried between cycles is the returned [`SmoothingState`].
//! [`TeleopSession`] wraps it for the periodic caller.

use tracing::{debug, info, warn};

use super::arbiter::{arbitrate, Arbitration, DigitalSignal, InputSource, ModeSignals, OverrideSource};
use super::command::{DriveCommand, DriveSink, LoopState};
use super::deadzone::Deadzone;
use super::input::{AxisTriple, RawInputSource};
use super::potentiometer::{CalibrationBaseline, PotNormalizer};
use super::scaling::{normalize_speed_limit, ScalingStage};
use super::smoothing::{SmoothingFilter, SmoothingState};
use super::status::{StatusReport, StatusSink};
use crate::config::Config;

/// Every tunable of the control cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TeleopParams {
    pub joystick_deadzone: Deadzone,
    pub pot_deadzone: Deadzone,
    pub pot: PotNormalizer,
    pub pot_x_channel: usize,
    pub pot_y_channel: usize,
    pub scaling: ScalingStage,
    pub speed_limit_max_volts: f32,
    pub smoothing: SmoothingFilter,
    /// Zero the smoothing memory whenever the interlock stops the platform.
    pub reset_smoothing_on_stop: bool,
    pub trigger_button: usize,
    pub smoothing_bypass_button: usize,
    pub rotate_enable_button: usize,
    pub override_source: OverrideSource,
    pub safety_trigger: DigitalSignal,
}

impl Default for TeleopParams {
    fn default() -> Self {
        Self {
            joystick_deadzone: Deadzone::uniform(0.06),
            pot_deadzone: Deadzone::uniform(0.0),
            pot: PotNormalizer::new(0, 1023, 51),
            pot_x_channel: 0,
            pot_y_channel: 1,
            scaling: ScalingStage::new(1.0),
            speed_limit_max_volts: 5.0,
            smoothing: SmoothingFilter::default(),
            reset_smoothing_on_stop: false,
            trigger_button: 0,
            smoothing_bypass_button: 10,
            rotate_enable_button: 11,
            override_source: OverrideSource::Digital { channel: 1, active_low: false },
            safety_trigger: DigitalSignal { channel: 0, active_low: false },
        }
    }
}

impl TeleopParams {
    /// Builds cycle parameters from a validated configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let pot = &config.potentiometer;
        let drive = &config.drive;
        let joystick = &config.joystick;

        Self {
            joystick_deadzone: Deadzone::uniform(joystick.deadzone),
            pot_deadzone: Deadzone::uniform(pot.deadzone),
            pot: PotNormalizer::new(pot.range_min, pot.range_max, pot.deadzone_raw),
            pot_x_channel: pot.x_channel,
            pot_y_channel: pot.y_channel,
            scaling: ScalingStage::new(drive.power_factor),
            speed_limit_max_volts: drive.speed_limit_max_volts,
            smoothing: SmoothingFilter {
                x: drive.smoothing.x,
                y: drive.smoothing.y,
                z: drive.smoothing.z,
            },
            reset_smoothing_on_stop: drive.reset_smoothing_on_stop,
            trigger_button: joystick.trigger_button,
            smoothing_bypass_button: joystick.smoothing_bypass_button,
            rotate_enable_button: joystick.rotate_enable_button,
            override_source: config.arbiter.source_override,
            safety_trigger: config.arbiter.safety_trigger,
        }
    }
}

/// Everything one cycle produces.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub command: DriveCommand,
    pub state: LoopState,
    pub arbitration: Arbitration,
    /// Smoothing memory for the next cycle.
    pub smoothing: SmoothingState,
    pub status: StatusReport,
}

/// Runs the pipeline once.
///
/// The interlock is evaluated first; when it fires no axis is read and the
/// command is exactly zero. The smoothing memory is then kept as it was
/// (or zeroed if `reset_smoothing_on_stop`) so a release resumes smoothly.
pub fn run_cycle<I: RawInputSource + ?Sized>(
    params: &TeleopParams,
    baseline: &CalibrationBaseline,
    previous: SmoothingState,
    inputs: &mut I,
) -> CycleOutcome {
    let buttons = inputs.joystick_buttons();
    let signals = ModeSignals {
        override_asserted: params.override_source.asserted(inputs),
        safety_trigger_asserted: params.safety_trigger.asserted(inputs),
        joystick_trigger_held: buttons.pressed(params.trigger_button),
    };
    let arbitration = arbitrate(&signals);

    let (command, state, smoothing, axes) = if arbitration.force_stop {
        let smoothing = if params.reset_smoothing_on_stop {
            SmoothingState::ZERO
        } else {
            previous
        };
        (DriveCommand::STOP, LoopState::Stopped, smoothing, AxisTriple::ZERO)
    } else {
        let (raw, deadzone) = match arbitration.source {
            InputSource::Joystick => (inputs.joystick_axes(), &params.joystick_deadzone),
            InputSource::Potentiometer => (
                params.pot.read(inputs, baseline, params.pot_x_channel, params.pot_y_channel),
                &params.pot_deadzone,
            ),
        };

        let filtered = deadzone.apply(raw);
        let speed_limit =
            normalize_speed_limit(inputs.speed_limit_volts(), params.speed_limit_max_volts);
        let scaled = params.scaling.apply(filtered, speed_limit);
        let bypass = buttons.pressed(params.smoothing_bypass_button);
        let (output, smoothing) = params.smoothing.apply(previous, scaled, bypass);

        let command = DriveCommand::from_axes(output, buttons.pressed(params.rotate_enable_button));
        (command, LoopState::Driving, smoothing, output)
    };

    let pot_raw = (0..inputs.pot_channel_count())
        .map(|channel| inputs.pot_raw(channel))
        .collect();
    let digital = (0..inputs.digital_channel_count())
        .map(|channel| inputs.digital_input(channel))
        .collect();

    CycleOutcome {
        command,
        state,
        arbitration,
        smoothing,
        status: StatusReport {
            axes,
            buttons,
            pot_raw,
            digital,
            source: arbitration.source,
            state,
        },
    }
}

/// One teleoperation session: baseline plus smoothing memory.
///
/// Starting a session is the only place the potentiometer baseline is
/// captured. Dropping the session discards all loop state.
#[derive(Debug, Clone)]
pub struct TeleopSession {
    params: TeleopParams,
    baseline: CalibrationBaseline,
    smoothing: SmoothingState,
    last_state: LoopState,
    last_source: Option<InputSource>,
    cycles: u64,
}

impl TeleopSession {
    /// Captures a fresh calibration baseline and zeroes the smoothing memory.
    pub fn start<I: RawInputSource + ?Sized>(params: TeleopParams, inputs: &mut I) -> Self {
        let baseline =
            CalibrationBaseline::capture(inputs, params.pot_x_channel, params.pot_y_channel);
        info!(
            "Teleop session started (pot baseline x={}, y={})",
            baseline.x, baseline.y
        );

        Self {
            params,
            baseline,
            smoothing: SmoothingState::ZERO,
            last_state: LoopState::Stopped,
            last_source: None,
            cycles: 0,
        }
    }

    #[must_use]
    pub fn baseline(&self) -> CalibrationBaseline {
        self.baseline
    }

    #[must_use]
    pub fn smoothing(&self) -> SmoothingState {
        self.smoothing
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.last_state
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Runs one cycle, forwards the command and status, and keeps the new
    /// smoothing state.
    pub fn periodic<I, D, S>(&mut self, inputs: &mut I, drive: &mut D, status: &mut S) -> DriveCommand
    where
        I: RawInputSource + ?Sized,
        D: DriveSink + ?Sized,
        S: StatusSink + ?Sized,
    {
        let outcome = run_cycle(&self.params, &self.baseline, self.smoothing, inputs);

        if self.last_source != Some(outcome.arbitration.source) {
            info!("Input source: {}", outcome.arbitration.source);
            self.last_source = Some(outcome.arbitration.source);
        }
        match (self.last_state, outcome.state) {
            (LoopState::Driving, LoopState::Stopped) => warn!("Interlock engaged, drive stopped"),
            (LoopState::Stopped, LoopState::Driving) => info!("Interlock released, driving"),
            _ => {}
        }

        debug!(
            forward = outcome.command.forward,
            strafe = outcome.command.strafe,
            rotate = outcome.command.rotate,
            rotate_enable = outcome.command.rotate_enable,
            "cycle {}",
            self.cycles
        );

        self.smoothing = outcome.smoothing;
        self.last_state = outcome.state;
        self.cycles += 1;

        drive.drive(&outcome.command);
        status.report(&outcome.status);
        outcome.command
    }
}
