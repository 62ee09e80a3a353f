//! # ChairBot Teleop Library
//!
//! Drive a ChairBot from a hand-held joystick or a steering console.
//!
//! Every control tick reads the inputs, picks the active source, gates motion
//! on the safety interlock, then filters, scales and smooths the axes into a
//! drive command for the motor controller board.

pub mod config;
pub mod drive;
pub mod error;
pub mod input;
pub mod serial;
pub mod teleop;
