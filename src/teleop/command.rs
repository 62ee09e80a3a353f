//! # Drive Command
//!
//! The logical command handed to the drive collaborator once per cycle.
//! Kinematic mixing and motor-range clamping happen on the other side of
//! [`DriveSink`].

use super::input::AxisTriple;

/// Operational state of the loop, recomputed from scratch every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// All outputs zero. Initial state, and any cycle the interlock is active.
    #[default]
    Stopped,
    /// Normal pipeline output.
    Driving,
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopState::Stopped => write!(f, "STOPPED"),
            LoopState::Driving => write!(f, "DRIVING"),
        }
    }
}

/// Forward/strafe/rotate intent plus the rotate-enable button.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveCommand {
    pub forward: f32,
    pub strafe: f32,
    pub rotate: f32,
    /// Turning is only applied while this is set.
    pub rotate_enable: bool,
}

impl DriveCommand {
    /// Zero command used while stopped.
    pub const STOP: DriveCommand = DriveCommand {
        forward: 0.0,
        strafe: 0.0,
        rotate: 0.0,
        rotate_enable: false,
    };

    /// Maps a final axis triple: forward = y, strafe = x, rotate = z.
    #[must_use]
    pub fn from_axes(axes: AxisTriple, rotate_enable: bool) -> Self {
        Self {
            forward: axes.y,
            strafe: axes.x,
            rotate: axes.z,
            rotate_enable,
        }
    }

    /// Returns true if no axis commands motion.
    #[must_use]
    pub fn is_stop(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0 && self.rotate == 0.0
    }
}

/// Receives the drive command each cycle.
#[cfg_attr(test, mockall::automock)]
pub trait DriveSink {
    fn drive(&mut self, command: &DriveCommand);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_axes_mapping() {
        let cmd = DriveCommand::from_axes(AxisTriple::new(0.1, 0.2, 0.3), true);
        assert_eq!(cmd.strafe, 0.1);
        assert_eq!(cmd.forward, 0.2);
        assert_eq!(cmd.rotate, 0.3);
        assert!(cmd.rotate_enable);
    }

    #[test]
    fn test_stop_command() {
        assert!(DriveCommand::STOP.is_stop());
        assert!(DriveCommand::default().is_stop());
        assert!(!DriveCommand::from_axes(AxisTriple::new(0.0, 0.01, 0.0), false).is_stop());
    }

    #[test]
    fn test_loop_state_default_stopped() {
        assert_eq!(LoopState::default(), LoopState::Stopped);
        assert_eq!(LoopState::Driving.to_string(), "DRIVING");
    }
}
