//! # Error Types
//!
//! Custom error types for the teleop stack using `thiserror`.
//!
//! The control pipeline itself never fails; these errors come from the
//! outer shell (configuration, input devices, the motor serial link).

use thiserror::Error;

/// Main error type for ChairBot teleop
#[derive(Debug, Error)]
pub enum TeleopError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial link errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial ports could be opened
    #[error("No motor controller found on: {0}")]
    SerialPortNotFound(String),

    /// Input device errors
    #[error("Input device error: {0}")]
    InputDevice(String),

    /// No input device matched the requested path or name
    #[error("Input device not found: {0}")]
    InputDeviceNotFound(String),
}

/// Result type alias for ChairBot teleop
pub type Result<T> = std::result::Result<T, TeleopError>;
