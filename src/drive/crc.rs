//! # Frame Checksum
//!
//! CRC-8/DVB-S2 (polynomial 0xD5, init 0x00, no reflection, no final XOR),
//! the checksum the motor controller board verifies on every drive frame.

/// Generator polynomial x^8 + x^7 + x^6 + x^4 + x^2 + 1.
const POLYNOMIAL: u8 = 0xD5;

/// Byte-wise lookup table, built at compile time.
const TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut byte = 0;

    while byte < 256 {
        let mut crc = byte as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[byte] = crc;
        byte += 1;
    }

    table
}

/// Checksums `data` (length + type + payload of a frame).
///
/// ```
/// use chairbot_teleop::drive::crc::crc8;
///
/// assert_eq!(crc8(&[]), 0x00);
/// assert_eq!(crc8(b"123456789"), 0xBC);
/// ```
#[must_use]
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| TABLE[(crc ^ byte) as usize])
}
