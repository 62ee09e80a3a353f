//! # Kinematic Mixer
//!
//! Turns a [`DriveCommand`] into four wheel powers.
//!
//! ## Arcade (differential)
//!
//! Forward intent drives both sides; lateral intent (the command's strafe)
//! turns, adding to one side and subtracting from the other. With
//! `squared_inputs` both inputs are squared (sign kept) for finer control near
//! center. Front and rear wheels of a side get the same power.
//!
//! ## Mecanum
//!
//! ```text
//! front_left  =  strafe + forward + turn
//! front_right = -strafe + forward - turn
//! rear_left   = -strafe + forward + turn
//! rear_right  =  strafe + forward - turn
//! ```
//!
//! scaled down together so no wheel exceeds full power.
//!
//! Here `turn` is the command's rotate value while `rotate_enable` is held,
//! and zero otherwise.
//!
//! Every output is clamped to `-1.0..=1.0` and then negated for inverted
//! wheels.

use serde::Deserialize;

use crate::teleop::command::DriveCommand;

/// Drivetrain layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kinematics {
    #[default]
    Arcade,
    Mecanum,
}

/// Wheel index order used for invert flags and frames.
pub const FRONT_LEFT: usize = 0;
pub const REAR_LEFT: usize = 1;
pub const FRONT_RIGHT: usize = 2;
pub const REAR_RIGHT: usize = 3;

/// Power for each wheel in `-1.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelPowers(pub [f32; 4]);

impl WheelPowers {
    pub const STOP: WheelPowers = WheelPowers([0.0; 4]);

    #[must_use]
    pub fn front_left(&self) -> f32 {
        self.0[FRONT_LEFT]
    }

    #[must_use]
    pub fn rear_left(&self) -> f32 {
        self.0[REAR_LEFT]
    }

    #[must_use]
    pub fn front_right(&self) -> f32 {
        self.0[FRONT_RIGHT]
    }

    #[must_use]
    pub fn rear_right(&self) -> f32 {
        self.0[REAR_RIGHT]
    }
}

/// Maps drive commands to wheel powers for a configured drivetrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveMixer {
    kinematics: Kinematics,
    squared_inputs: bool,
    inverted: [bool; 4],
}

impl DriveMixer {
    #[must_use]
    pub fn new(kinematics: Kinematics, squared_inputs: bool, inverted: [bool; 4]) -> Self {
        Self {
            kinematics,
            squared_inputs,
            inverted,
        }
    }

    /// Mixes one command.
    ///
    /// ```
    /// use chairbot_teleop::drive::mixer::{DriveMixer, Kinematics};
    /// use chairbot_teleop::teleop::command::DriveCommand;
    ///
    /// let mixer = DriveMixer::new(Kinematics::Arcade, false, [false; 4]);
    /// let cmd = DriveCommand { forward: 0.5, strafe: 0.0, rotate: 0.0, rotate_enable: false };
    /// assert_eq!(mixer.mix(&cmd).0, [0.5; 4]);
    /// ```
    #[must_use]
    pub fn mix(&self, command: &DriveCommand) -> WheelPowers {
        let mut wheels = match self.kinematics {
            Kinematics::Arcade => {
                let (left, right) = self.arcade(command.forward, command.strafe);
                let mut wheels = [0.0; 4];
                wheels[FRONT_LEFT] = left;
                wheels[REAR_LEFT] = left;
                wheels[FRONT_RIGHT] = right;
                wheels[REAR_RIGHT] = right;
                wheels
            }
            Kinematics::Mecanum => {
                let turn = if command.rotate_enable { command.rotate } else { 0.0 };
                Self::mecanum(command.strafe, command.forward, turn)
            }
        };

        for (power, &inverted) in wheels.iter_mut().zip(self.inverted.iter()) {
            *power = power.clamp(-1.0, 1.0);
            if inverted {
                *power = -*power;
            }
        }

        WheelPowers(wheels)
    }

    /// Returns (left, right) side power.
    fn arcade(&self, forward: f32, turn: f32) -> (f32, f32) {
        let mut forward = forward.clamp(-1.0, 1.0);
        let mut turn = turn.clamp(-1.0, 1.0);

        if self.squared_inputs {
            forward = forward.abs() * forward;
            turn = turn.abs() * turn;
        }

        if forward > 0.0 {
            if turn > 0.0 {
                (forward - turn, forward.max(turn))
            } else {
                (forward.max(-turn), forward + turn)
            }
        } else if turn > 0.0 {
            (-(-forward).max(turn), forward + turn)
        } else {
            (forward - turn, -(-forward).max(-turn))
        }
    }

    fn mecanum(strafe: f32, forward: f32, turn: f32) -> [f32; 4] {
        let mut wheels = [0.0; 4];
        wheels[FRONT_LEFT] = strafe + forward + turn;
        wheels[FRONT_RIGHT] = -strafe + forward - turn;
        wheels[REAR_LEFT] = -strafe + forward + turn;
        wheels[REAR_RIGHT] = strafe + forward - turn;

        let max = wheels.iter().fold(0.0f32, |acc, w| acc.max(w.abs()));
        if max > 1.0 {
            for w in wheels.iter_mut() {
                *w /= max;
            }
        }
        wheels
    }
}
