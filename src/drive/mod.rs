//! # Drive Module
//!
//! The drive collaborator on the far side of [`DriveSink`](crate::teleop::command::DriveSink).
//!
//! This module handles:
//! - Arcade and mecanum kinematic mixing with per-wheel inversion
//! - Encoding wheel powers into CRC-checked motor frames
//! - Queuing frames for the serial link

pub mod crc;
pub mod frame;
pub mod mixer;
pub mod output;

pub use mixer::{DriveMixer, Kinematics, WheelPowers};
pub use output::MotorOutput;
