//! # Input Device Discovery
//!
//! Opens the joystick, the operator console and the auxiliary button panels
//! through the Linux evdev interface.
//!
//! A device is either opened by explicit path or found by scanning
//! `/dev/input/event*` (sorted, so the choice is deterministic) for the first
//! device whose name contains the configured hint.

use evdev::{Device, EventStream, EventType, InputEvent};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, TeleopError};

/// Directory scanned for evdev nodes
const INPUT_DIR: &str = "/dev/input";

/// Which physical device an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    Joystick,
    Console,
    Panel(usize),
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRole::Joystick => write!(f, "joystick"),
            DeviceRole::Console => write!(f, "console"),
            DeviceRole::Panel(index) => write!(f, "panel {}", index),
        }
    }
}

/// An opened evdev device tagged with its role
pub struct InputDevice {
    device: Device,
    device_path: String,
    role: DeviceRole,
}

impl fmt::Debug for InputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputDevice")
            .field("device_path", &self.device_path)
            .field("role", &self.role)
            .field("name", &self.device.name())
            .finish()
    }
}

impl InputDevice {
    /// Open `path` if given, otherwise the first device whose name contains `name_hint`
    ///
    /// # Errors
    ///
    /// - `InputDevice`: the path could not be opened or `/dev/input` is unreadable
    /// - `InputDeviceNotFound`: no device name matched the hint
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chairbot_teleop::input::{DeviceRole, InputDevice};
    ///
    /// let joystick = InputDevice::open(DeviceRole::Joystick, "", "Attack 3")?;
    /// println!("Joystick at: {}", joystick.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(role: DeviceRole, path: &str, name_hint: &str) -> Result<Self> {
        if !path.is_empty() {
            return Self::open_path(role, Path::new(path));
        }

        let input_dir = Path::new(INPUT_DIR);
        if !input_dir.exists() {
            return Err(TeleopError::InputDevice(format!("{} directory not found", INPUT_DIR)));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| TeleopError::InputDevice(format!("Failed to read {}: {}", INPUT_DIR, e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TeleopError::InputDevice(format!("Failed to read directory entry: {}", e)))?;

        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            if !is_event_node(&path) {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    let name = device.name().unwrap_or_default().to_string();
                    debug!("Found input device: {} ({:?})", path.display(), name);

                    if name_matches(&name, name_hint) {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found {} \"{}\" at: {}", role, name, device_path);
                        return Ok(Self { device, device_path, role });
                    }
                }
                Err(e) => {
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(TeleopError::InputDeviceNotFound(format!(
            "no {} named like \"{}\"",
            role, name_hint
        )))
    }

    fn open_path(role: DeviceRole, path: &Path) -> Result<Self> {
        let device = Device::open(path).map_err(|e| {
            TeleopError::InputDevice(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let device_path = path.to_string_lossy().to_string();
        info!("Opened {} at: {}", role, device_path);
        Ok(Self { device, device_path, role })
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn role(&self) -> DeviceRole {
        self.role
    }

    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Current axis values and held keys, as synthetic events
    ///
    /// evdev only reports changes, so this seeds the input state with
    /// whatever the device already holds when the session starts.
    pub fn initial_events(&self) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();

        if let Some(axes) = self.device.supported_absolute_axes() {
            let state = self.device.get_abs_state().map_err(|e| {
                TeleopError::InputDevice(format!("Failed to read axes of {}: {}", self.device_path, e))
            })?;
            for axis in axes.iter() {
                if let Some(info) = state.get(axis.0 as usize) {
                    events.push(InputEvent::new(EventType::ABSOLUTE, axis.0, info.value));
                }
            }
        }

        let keys = self.device.get_key_state().map_err(|e| {
            TeleopError::InputDevice(format!("Failed to read keys of {}: {}", self.device_path, e))
        })?;
        for key in keys.iter() {
            events.push(InputEvent::new(EventType::KEY, key.code(), 1));
        }

        Ok(events)
    }

    /// Convert into an async event stream
    ///
    /// # Errors
    ///
    /// Returns `InputDevice` if the device cannot be switched to non-blocking mode
    pub fn into_stream(self) -> Result<EventStream> {
        let path = self.device_path;
        self.device
            .into_event_stream()
            .map_err(|e| TeleopError::InputDevice(format!("Failed to stream {}: {}", path, e)))
    }
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with("event"))
        .unwrap_or(false)
}

/// Case-insensitive substring match; an empty hint matches nothing
fn name_matches(name: &str, hint: &str) -> bool {
    !hint.is_empty() && name.to_lowercase().contains(&hint.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(DeviceRole::Joystick.to_string(), "joystick");
        assert_eq!(DeviceRole::Console.to_string(), "console");
        assert_eq!(DeviceRole::Panel(2).to_string(), "panel 2");
    }

    #[test]
    fn test_name_matches() {
        assert!(name_matches("Logitech Logitech Attack 3", "Attack 3"));
        assert!(name_matches("Logitech Logitech Attack 3", "attack"));
        assert!(!name_matches("Sony Wireless Controller", "Attack 3"));
        assert!(!name_matches("Logitech Attack 3", ""));
    }

    #[test]
    fn test_is_event_node() {
        assert!(is_event_node(Path::new("/dev/input/event3")));
        assert!(!is_event_node(Path::new("/dev/input/js0")));
        assert!(!is_event_node(Path::new("/dev/input/mice")));
    }

    #[test]
    fn test_open_missing_path() {
        let result = InputDevice::open(DeviceRole::Console, "/dev/input/nonexistent_event_999", "");
        match result {
            Err(TeleopError::InputDevice(msg)) => {
                assert!(msg.contains("nonexistent_event_999"));
            }
            other => panic!("expected InputDevice error, got {:?}", other),
        }
    }

    #[test]
    fn test_open_unmatched_hint() {
        let result = InputDevice::open(
            DeviceRole::Joystick,
            "",
            "No Such Joystick Model 0xDEADBEEF",
        );
        assert!(matches!(
            result,
            Err(TeleopError::InputDeviceNotFound(_)) | Err(TeleopError::InputDevice(_))
        ));
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_joystick_with_real_hardware() {
        let joystick = InputDevice::open(DeviceRole::Joystick, "", "Attack 3").unwrap();
        assert!(joystick.device_path().starts_with("/dev/input/event"));
        assert!(!joystick.initial_events().unwrap().is_empty());
    }
}
