//! Drive collaborator that mixes each command and queues the resulting frame
//! for the serial link. The control cycle stays synchronous; the caller sends
//! the queued frame after the cycle returns.

use bytes::Bytes;
use tracing::trace;

use super::frame::encode_wheel_powers_frame;
use super::mixer::{DriveMixer, WheelPowers};
use crate::teleop::command::{DriveCommand, DriveSink};

#[derive(Debug)]
pub struct MotorOutput {
    mixer: DriveMixer,
    last_powers: WheelPowers,
    pending: Option<Bytes>,
}

impl MotorOutput {
    #[must_use]
    pub fn new(mixer: DriveMixer) -> Self {
        Self {
            mixer,
            last_powers: WheelPowers::STOP,
            pending: None,
        }
    }

    /// Wheel powers from the most recent command.
    #[must_use]
    pub fn last_powers(&self) -> WheelPowers {
        self.last_powers
    }

    /// Takes the frame queued by the latest command, if not yet sent.
    pub fn take_frame(&mut self) -> Option<Bytes> {
        self.pending.take()
    }

    /// Frame that stops every wheel, independent of any queued command.
    #[must_use]
    pub fn stop_frame() -> Bytes {
        encode_wheel_powers_frame(&WheelPowers::STOP)
    }
}

impl DriveSink for MotorOutput {
    fn drive(&mut self, command: &DriveCommand) {
        let powers = self.mixer.mix(command);
        trace!(?powers, "mixed drive command");
        self.last_powers = powers;
        self.pending = Some(encode_wheel_powers_frame(&powers));
    }
}
