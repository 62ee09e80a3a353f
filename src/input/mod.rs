//! # Input Module
//!
//! Reads the joystick, operator console and auxiliary button panels from
//! Linux evdev devices and folds their events into the readings the control
//! cycle consumes.
//!
//! This module handles:
//! - Device discovery by path or name
//! - Seeding state from what each device already holds
//! - Accumulating events per device role into [`InputState`]

pub mod device;
pub mod state;

pub use device::{DeviceRole, InputDevice};
pub use state::{InputLayout, InputState};
