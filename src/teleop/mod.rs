//! # Teleop Module
//!
//! The control loop core. Hardware-free: everything it reads or writes goes
//! through [`input::RawInputSource`], [`command::DriveSink`] and
//! [`status::StatusSink`].
//!
//! This module handles:
//! - Selecting joystick or steering-assembly input each cycle
//! - The safety interlock
//! - Deadzones, potentiometer normalization, power scaling
//! - Exponential smoothing of the drive command

pub mod input;
pub mod deadzone;
pub mod potentiometer;
pub mod arbiter;
pub mod scaling;
pub mod smoothing;
pub mod command;
pub mod status;
pub mod pipeline;

pub use pipeline::{run_cycle, CycleOutcome, TeleopParams, TeleopSession};
