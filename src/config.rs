//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every tunable of the control loop lives here instead of in source:
//! deadzones, smoothing weights, potentiometer range, power factor, button
//! assignments and the wiring of the interlock and override signals.

use serde::Deserialize;
use serde::de::Error;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use crate::drive::mixer::Kinematics;
use crate::error::{Result, TeleopError};
use crate::teleop::arbiter::{DigitalSignal, OverrideSource};
use crate::teleop::input::BUTTON_COUNT;
use crate::teleop::smoothing::SmoothingWeights;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub control: ControlConfig,
    pub joystick: JoystickConfig,
    pub console: ConsoleConfig,
    pub potentiometer: PotentiometerConfig,
    pub arbiter: ArbiterConfig,
    pub drive: DriveConfig,
    pub serial: SerialConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Control loop timing
#[derive(Debug, Deserialize, Clone)]
pub struct ControlConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,

    #[serde(default = "default_status_interval_cycles")]
    pub status_interval_cycles: u64,
}

/// Hand-held joystick
#[derive(Debug, Deserialize, Clone)]
pub struct JoystickConfig {
    /// Empty means auto-detect by `name_hint`.
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_joystick_name_hint")]
    pub name_hint: String,

    /// evdev ABS codes for the x, y and z axes.
    #[serde(default = "default_joystick_axis_codes")]
    pub axis_codes: [u16; 3],

    #[serde(default = "default_axis_min")]
    pub axis_min: i32,

    #[serde(default = "default_axis_max")]
    pub axis_max: i32,

    #[serde(default = "default_joystick_deadzone")]
    pub deadzone: f32,

    #[serde(default = "default_trigger_button")]
    pub trigger_button: usize,

    #[serde(default = "default_smoothing_bypass_button")]
    pub smoothing_bypass_button: usize,

    #[serde(default = "default_rotate_enable_button")]
    pub rotate_enable_button: usize,
}

/// Operator console: steering potentiometers, digital inputs, speed-limit knob
#[derive(Debug, Deserialize, Clone)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_console_name_hint")]
    pub name_hint: String,

    /// evdev ABS codes, one per potentiometer channel.
    #[serde(default = "default_pot_axis_codes")]
    pub pot_axis_codes: Vec<u16>,

    /// evdev key codes, one per digital input channel.
    #[serde(default = "default_digital_key_codes")]
    pub digital_key_codes: Vec<u16>,

    #[serde(default = "default_speed_limit_axis_code")]
    pub speed_limit_axis_code: u16,

    #[serde(default = "default_axis_min")]
    pub speed_limit_raw_min: i32,

    #[serde(default = "default_axis_max")]
    pub speed_limit_raw_max: i32,

    /// Auxiliary 12-button panels, in panel index order.
    #[serde(default)]
    pub panel_device_paths: Vec<String>,
}

/// Steering assembly calibration
#[derive(Debug, Deserialize, Clone)]
pub struct PotentiometerConfig {
    #[serde(default = "default_pot_range_min")]
    pub range_min: i32,

    #[serde(default = "default_pot_range_max")]
    pub range_max: i32,

    /// Raw distance from the baseline treated as neutral.
    #[serde(default = "default_pot_deadzone_raw")]
    pub deadzone_raw: i32,

    /// Deadzone applied to the normalized steering triple.
    #[serde(default = "default_pot_deadzone")]
    pub deadzone: f32,

    #[serde(default = "default_pot_x_channel")]
    pub x_channel: usize,

    #[serde(default = "default_pot_y_channel")]
    pub y_channel: usize,
}

/// Source selection and interlock wiring
#[derive(Debug, Deserialize, Clone)]
pub struct ArbiterConfig {
    #[serde(rename = "override", default = "default_override")]
    pub source_override: OverrideSource,

    #[serde(default = "default_safety_trigger")]
    pub safety_trigger: DigitalSignal,
}

/// Per-axis smoothing weights
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AxisSmoothingConfig {
    #[serde(default)]
    pub x: SmoothingWeights,
    #[serde(default)]
    pub y: SmoothingWeights,
    #[serde(default)]
    pub z: SmoothingWeights,
}

/// Drive output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    #[serde(default = "default_power_factor")]
    pub power_factor: f32,

    #[serde(default = "default_speed_limit_max_volts")]
    pub speed_limit_max_volts: f32,

    #[serde(default)]
    pub smoothing: AxisSmoothingConfig,

    #[serde(default)]
    pub reset_smoothing_on_stop: bool,

    #[serde(default)]
    pub kinematics: Kinematics,

    #[serde(default = "default_squared_inputs")]
    pub squared_inputs: bool,

    /// Invert flags: front-left, rear-left, front-right, rear-right.
    #[serde(default)]
    pub inverted: [bool; 4],
}

/// Motor controller serial link
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Optional rolling log file
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default)]
    pub directory: Option<String>,

    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: default_log_file_prefix(),
        }
    }
}

/// Serial baud rates the motor controller board accepts
const ALLOWED_BAUD_RATES: [u32; 6] = [9600, 19200, 38400, 57600, 115200, 230400];

// Default value functions
fn default_rate_hz() -> u32 { 50 }
fn default_status_interval_cycles() -> u64 { 10 }

fn default_joystick_name_hint() -> String { "Attack 3".to_string() }
fn default_joystick_axis_codes() -> [u16; 3] { [0, 1, 2] }
fn default_axis_min() -> i32 { 0 }
fn default_axis_max() -> i32 { 255 }
fn default_joystick_deadzone() -> f32 { 0.06 }
fn default_trigger_button() -> usize { 0 }
fn default_smoothing_bypass_button() -> usize { 10 }
fn default_rotate_enable_button() -> usize { 11 }

fn default_console_name_hint() -> String { "Steering".to_string() }
fn default_pot_axis_codes() -> Vec<u16> { vec![0, 1, 2] }
fn default_digital_key_codes() -> Vec<u16> { vec![0x120, 0x121] }
fn default_speed_limit_axis_code() -> u16 { 6 }

fn default_pot_range_min() -> i32 { 0 }
fn default_pot_range_max() -> i32 { 1023 }
fn default_pot_deadzone_raw() -> i32 { 51 }
fn default_pot_deadzone() -> f32 { 0.0 }
fn default_pot_x_channel() -> usize { 0 }
fn default_pot_y_channel() -> usize { 1 }

fn default_override() -> OverrideSource { OverrideSource::Digital { channel: 1, active_low: false } }
fn default_safety_trigger() -> DigitalSignal { DigitalSignal { channel: 0, active_low: false } }

fn default_power_factor() -> f32 { 1.0 }
fn default_speed_limit_max_volts() -> f32 { 5.0 }
fn default_squared_inputs() -> bool { true }

fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_timeout_ms() -> u64 { 100 }

fn default_log_file_prefix() -> String { "chairbot-teleop.log".to_string() }

fn invalid(message: impl Display) -> TeleopError {
    TeleopError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chairbot_teleop::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Control loop timing
        if self.control.rate_hz == 0 || self.control.rate_hz > 500 {
            return Err(invalid("rate_hz must be between 1 and 500"));
        }

        if self.control.status_interval_cycles == 0 {
            return Err(invalid("status_interval_cycles must be greater than 0"));
        }

        // Deadzones
        if !(0.0..=0.5).contains(&self.joystick.deadzone) {
            return Err(invalid("joystick deadzone must be between 0.0 and 0.5"));
        }

        if !(0.0..=0.5).contains(&self.potentiometer.deadzone) {
            return Err(invalid("potentiometer deadzone must be between 0.0 and 0.5"));
        }

        // Joystick raw range and buttons
        if self.joystick.axis_min >= self.joystick.axis_max {
            return Err(invalid("joystick axis_min must be less than axis_max"));
        }

        for (name, index) in [
            ("trigger_button", self.joystick.trigger_button),
            ("smoothing_bypass_button", self.joystick.smoothing_bypass_button),
            ("rotate_enable_button", self.joystick.rotate_enable_button),
        ] {
            if index >= BUTTON_COUNT {
                return Err(invalid(format!(
                    "{} index {} is out of bounds (must be 0-{})",
                    name, index, BUTTON_COUNT - 1
                )));
            }
        }

        // Potentiometer calibration
        if self.potentiometer.range_min >= self.potentiometer.range_max {
            return Err(invalid("potentiometer range_min must be less than range_max"));
        }

        if self.potentiometer.deadzone_raw < 0 {
            return Err(invalid("potentiometer deadzone_raw cannot be negative"));
        }

        let pot_channels = self.console.pot_axis_codes.len();
        for (name, channel) in [
            ("x_channel", self.potentiometer.x_channel),
            ("y_channel", self.potentiometer.y_channel),
        ] {
            if channel >= pot_channels {
                return Err(invalid(format!(
                    "potentiometer {} {} has no entry in console pot_axis_codes",
                    name, channel
                )));
            }
        }

        if self.potentiometer.x_channel == self.potentiometer.y_channel {
            return Err(invalid("potentiometer x_channel and y_channel must differ"));
        }

        // Speed-limit knob
        if self.console.speed_limit_raw_min >= self.console.speed_limit_raw_max {
            return Err(invalid("speed_limit_raw_min must be less than speed_limit_raw_max"));
        }

        // Interlock and override wiring
        let digital_channels = self.console.digital_key_codes.len();
        if self.arbiter.safety_trigger.channel >= digital_channels {
            return Err(invalid(format!(
                "safety_trigger channel {} has no entry in console digital_key_codes",
                self.arbiter.safety_trigger.channel
            )));
        }

        match self.arbiter.source_override {
            OverrideSource::Digital { channel, .. } => {
                if channel >= digital_channels {
                    return Err(invalid(format!(
                        "override channel {} has no entry in console digital_key_codes",
                        channel
                    )));
                }
            }
            OverrideSource::PanelButton { panel, button } => {
                if panel >= self.console.panel_device_paths.len() {
                    return Err(invalid(format!(
                        "override panel {} has no entry in console panel_device_paths",
                        panel
                    )));
                }
                if button >= BUTTON_COUNT {
                    return Err(invalid(format!(
                        "override button {} is out of bounds (must be 0-{})",
                        button, BUTTON_COUNT - 1
                    )));
                }
            }
        }

        // Drive scaling
        if !(0.0..=1.0).contains(&self.drive.power_factor) {
            return Err(invalid("power_factor must be between 0.0 and 1.0"));
        }

        if self.drive.speed_limit_max_volts <= 0.0 {
            return Err(invalid("speed_limit_max_volts must be greater than 0"));
        }

        for (name, weights) in [
            ("x", self.drive.smoothing.x),
            ("y", self.drive.smoothing.y),
            ("z", self.drive.smoothing.z),
        ] {
            if weights.previous < 0.0 || weights.current < 0.0 {
                return Err(invalid(format!("smoothing.{} weights cannot be negative", name)));
            }
            if weights.previous + weights.current <= 0.0 {
                return Err(invalid(format!("smoothing.{} weights must not both be 0", name)));
            }
        }

        // Serial link
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !ALLOWED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {:?}",
                ALLOWED_BAUD_RATES
            )));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        // Logging
        if let Some(directory) = &self.logging.directory {
            if directory.is_empty() {
                return Err(invalid("logging directory cannot be empty when set"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config {
            control: ControlConfig {
                rate_hz: default_rate_hz(),
                status_interval_cycles: default_status_interval_cycles(),
            },
            joystick: JoystickConfig {
                device_path: String::new(),
                name_hint: default_joystick_name_hint(),
                axis_codes: default_joystick_axis_codes(),
                axis_min: default_axis_min(),
                axis_max: default_axis_max(),
                deadzone: default_joystick_deadzone(),
                trigger_button: default_trigger_button(),
                smoothing_bypass_button: default_smoothing_bypass_button(),
                rotate_enable_button: default_rotate_enable_button(),
            },
            console: ConsoleConfig {
                device_path: String::new(),
                name_hint: default_console_name_hint(),
                pot_axis_codes: default_pot_axis_codes(),
                digital_key_codes: default_digital_key_codes(),
                speed_limit_axis_code: default_speed_limit_axis_code(),
                speed_limit_raw_min: default_axis_min(),
                speed_limit_raw_max: default_axis_max(),
                panel_device_paths: vec![],
            },
            potentiometer: PotentiometerConfig {
                range_min: default_pot_range_min(),
                range_max: default_pot_range_max(),
                deadzone_raw: default_pot_deadzone_raw(),
                deadzone: default_pot_deadzone(),
                x_channel: default_pot_x_channel(),
                y_channel: default_pot_y_channel(),
            },
            arbiter: ArbiterConfig {
                source_override: default_override(),
                safety_trigger: default_safety_trigger(),
            },
            drive: DriveConfig {
                power_factor: default_power_factor(),
                speed_limit_max_volts: default_speed_limit_max_volts(),
                smoothing: AxisSmoothingConfig::default(),
                reset_smoothing_on_stop: false,
                kinematics: Kinematics::default(),
                squared_inputs: default_squared_inputs(),
                inverted: [false; 4],
            },
            serial: SerialConfig {
                port: default_serial_port(),
                baud_rate: default_baud_rate(),
                timeout_ms: default_timeout_ms(),
            },
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_default_config() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[control]

[joystick]
deadzone = 0.08

[console]

[potentiometer]

[arbiter]

[drive]
kinematics = "mecanum"

[drive.smoothing.z]
previous = 9.0

[serial]
port = "/dev/ttyACM1"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.joystick.deadzone, 0.08);
        assert_eq!(config.drive.kinematics, Kinematics::Mecanum);
        assert_eq!(config.drive.smoothing.z.previous, 9.0);
        assert_eq!(config.drive.smoothing.z.current, 1.0);
        assert_eq!(config.drive.smoothing.x.previous, 49.0);
        assert_eq!(config.serial.port, "/dev/ttyACM1");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_load_shipped_default_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.control.rate_hz, 50);
        assert_eq!(config.joystick.smoothing_bypass_button, 10);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load("/nonexistent/chairbot.toml");
        assert!(matches!(result, Err(TeleopError::Io(_))));
    }

    #[test]
    fn test_missing_section() {
        let result = Config::from_toml("[control]\n");
        assert!(matches!(result, Err(TeleopError::Config(_))));
    }

    #[test]
    fn test_override_panel_button_from_toml() {
        let toml_content = r#"
[control]
[joystick]
[console]
panel_device_paths = ["/dev/input/event7"]
[potentiometer]
[arbiter.override]
kind = "panel_button"
panel = 0
button = 3
[arbiter.safety_trigger]
channel = 0
active_low = true
[drive]
[serial]
"#;
        let config = Config::from_toml(toml_content).unwrap();
        assert_eq!(
            config.arbiter.source_override,
            OverrideSource::PanelButton { panel: 0, button: 3 }
        );
        assert!(config.arbiter.safety_trigger.active_low);
    }

    #[test]
    fn test_rate_zero() {
        let mut config = create_valid_config();
        config.control.rate_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_too_high() {
        let mut config = create_valid_config();
        config.control.rate_hz = 501;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_status_interval_zero() {
        let mut config = create_valid_config();
        config.control.status_interval_cycles = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_joystick_deadzone_negative() {
        let mut config = create_valid_config();
        config.joystick.deadzone = -0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pot_deadzone_too_high() {
        let mut config = create_valid_config();
        config.potentiometer.deadzone = 0.6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_axis_range_inverted() {
        let mut config = create_valid_config();
        config.joystick.axis_min = 255;
        config.joystick.axis_max = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_button_out_of_bounds() {
        let mut config = create_valid_config();
        config.joystick.rotate_enable_button = 12;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pot_range_empty() {
        let mut config = create_valid_config();
        config.potentiometer.range_min = 500;
        config.potentiometer.range_max = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pot_deadzone_raw_negative() {
        let mut config = create_valid_config();
        config.potentiometer.deadzone_raw = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pot_channel_without_axis_code() {
        let mut config = create_valid_config();
        config.potentiometer.y_channel = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pot_channels_equal() {
        let mut config = create_valid_config();
        config.potentiometer.y_channel = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speed_limit_raw_range_inverted() {
        let mut config = create_valid_config();
        config.console.speed_limit_raw_min = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_safety_trigger_channel_missing() {
        let mut config = create_valid_config();
        config.arbiter.safety_trigger.channel = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_override_digital_channel_missing() {
        let mut config = create_valid_config();
        config.arbiter.source_override = OverrideSource::Digital { channel: 5, active_low: false };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_override_panel_missing() {
        let mut config = create_valid_config();
        config.arbiter.source_override = OverrideSource::PanelButton { panel: 0, button: 1 };
        assert!(config.validate().is_err());

        config.console.panel_device_paths = vec!["/dev/input/event9".to_string()];
        assert!(config.validate().is_ok());

        config.arbiter.source_override = OverrideSource::PanelButton { panel: 0, button: 12 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_power_factor_out_of_range() {
        let mut config = create_valid_config();
        config.drive.power_factor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speed_limit_max_volts_zero() {
        let mut config = create_valid_config();
        config.drive.speed_limit_max_volts = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_smoothing_weights_negative() {
        let mut config = create_valid_config();
        config.drive.smoothing.y.previous = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_smoothing_weights_both_zero() {
        let mut config = create_valid_config();
        config.drive.smoothing.x = SmoothingWeights { previous: 0.0, current: 0.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = create_valid_config();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = create_valid_config();
        config.serial.baud_rate = 420000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in &ALLOWED_BAUD_RATES {
            let mut config = create_valid_config();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_timeout_ms_bounds() {
        let mut config = create_valid_config();
        config.serial.timeout_ms = 0;
        assert!(config.validate().is_err());
        config.serial.timeout_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_directory() {
        let mut config = create_valid_config();
        config.logging.directory = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_rate_hz(), 50);
        assert_eq!(default_joystick_deadzone(), 0.06);
        assert_eq!(default_pot_deadzone(), 0.0);
        assert_eq!(default_pot_deadzone_raw(), 51);
        assert_eq!(default_pot_range_max(), 1023);
        assert_eq!(default_smoothing_bypass_button(), 10);
        assert_eq!(default_rotate_enable_button(), 11);
        assert_eq!(default_power_factor(), 1.0);
        assert_eq!(default_speed_limit_max_volts(), 5.0);
        assert_eq!(default_baud_rate(), 115200);
        assert_eq!(default_digital_key_codes(), vec![0x120, 0x121]);
    }
}
