//! # Motor Frame Encoder
//!
//! Encodes wheel powers into the frame the motor controller board reads from
//! the serial link.
//!
//! ```text
//! ┌──────┬────────┬──────┬───────────────────────────────┬─────┐
//! │ 0xA5 │ length │ 0x01 │ FL  RL  FR  RR  (i16 LE each) │ crc │
//! └──────┴────────┴──────┴───────────────────────────────┴─────┘
//! ```
//!
//! `length` counts type + payload + crc. Powers are sent as thousandths
//! (`-1000..=1000`). The CRC covers length, type and payload.

use bytes::{BufMut, Bytes, BytesMut};

use super::crc::crc8;
use super::mixer::WheelPowers;

/// Frame sync byte
pub const SYNC_BYTE: u8 = 0xA5;

/// Wheel power frame type
pub const FRAME_TYPE_WHEEL_POWERS: u8 = 0x01;

/// Wheel power payload size (4 wheels × i16)
pub const WHEEL_POWERS_PAYLOAD_SIZE: usize = 8;

/// Wheel power frame length field (type + payload + crc)
pub const WHEEL_POWERS_FRAME_LENGTH: u8 = (1 + WHEEL_POWERS_PAYLOAD_SIZE + 1) as u8;

/// Complete wheel power frame size (sync + length + type + payload + crc)
pub const WHEEL_POWERS_FRAME_SIZE: usize = 2 + WHEEL_POWERS_FRAME_LENGTH as usize;

/// Wire units per unit of power
pub const POWER_SCALE: f32 = 1000.0;

/// Converts a power in `-1.0..=1.0` to wire units, clamping out-of-range values.
///
/// ```
/// use chairbot_teleop::drive::frame::power_to_wire;
///
/// assert_eq!(power_to_wire(0.5), 500);
/// assert_eq!(power_to_wire(-2.0), -1000);
/// ```
#[must_use]
pub fn power_to_wire(power: f32) -> i16 {
    (power.clamp(-1.0, 1.0) * POWER_SCALE).round() as i16
}

/// Encodes a complete wheel power frame.
#[must_use]
pub fn encode_wheel_powers_frame(powers: &WheelPowers) -> Bytes {
    let mut frame = BytesMut::with_capacity(WHEEL_POWERS_FRAME_SIZE);
    frame.put_u8(SYNC_BYTE);
    frame.put_u8(WHEEL_POWERS_FRAME_LENGTH);
    frame.put_u8(FRAME_TYPE_WHEEL_POWERS);
    for &power in powers.0.iter() {
        frame.put_i16_le(power_to_wire(power));
    }

    // Everything after the sync byte
    let crc = crc8(&frame[1..]);
    frame.put_u8(crc);

    frame.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size() {
        let frame = encode_wheel_powers_frame(&WheelPowers::STOP);
        assert_eq!(frame.len(), WHEEL_POWERS_FRAME_SIZE);
        assert_eq!(frame.len(), 12);
    }

    #[test]
    fn test_frame_header() {
        let frame = encode_wheel_powers_frame(&WheelPowers::STOP);
        assert_eq!(frame[0], SYNC_BYTE);
        assert_eq!(frame[1], 10);
        assert_eq!(frame[2], FRAME_TYPE_WHEEL_POWERS);
    }

    #[test]
    fn test_stop_payload_is_zero() {
        let frame = encode_wheel_powers_frame(&WheelPowers::STOP);
        assert!(frame[3..11].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_payload_little_endian_order() {
        let frame = encode_wheel_powers_frame(&WheelPowers([1.0, -1.0, 0.5, -0.25]));
        assert_eq!(&frame[3..5], &1000i16.to_le_bytes());
        assert_eq!(&frame[5..7], &(-1000i16).to_le_bytes());
        assert_eq!(&frame[7..9], &500i16.to_le_bytes());
        assert_eq!(&frame[9..11], &(-250i16).to_le_bytes());
    }

    #[test]
    fn test_crc_covers_length_type_payload() {
        let frame = encode_wheel_powers_frame(&WheelPowers([0.1, 0.2, 0.3, 0.4]));
        let last = frame.len() - 1;
        assert_eq!(frame[last], crc8(&frame[1..last]));
    }

    #[test]
    fn test_different_powers_different_crc() {
        let a = encode_wheel_powers_frame(&WheelPowers([0.1, 0.0, 0.0, 0.0]));
        let b = encode_wheel_powers_frame(&WheelPowers([0.2, 0.0, 0.0, 0.0]));
        assert_ne!(a[11], b[11]);
    }

    #[test]
    fn test_power_to_wire_rounding() {
        assert_eq!(power_to_wire(0.0), 0);
        assert_eq!(power_to_wire(0.0104), 10);
        assert_eq!(power_to_wire(-0.0106), -11);
        assert_eq!(power_to_wire(1.3), 1000);
    }
}
