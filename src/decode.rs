use crate::capture::TransitionRecord;
use thiserror::Error;

/// Number of data bits in a frame.
pub const FRAME_BITS: usize = 40;

/// A high pulse held for more than this many polls encodes a one; shorter pulses encode a zero.
pub const ONE_BIT_THRESHOLD: u8 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    /// The capture ended before a full frame was seen.
    #[error("only {bits} of {FRAME_BITS} bits were received")]
    TooFewBits { bits: usize },
    /// The checksum byte does not match the payload.
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// A checksum-verified DHT22 frame.
///
/// Byte layout: `[humidity_hi, humidity_lo, temperature_hi, temperature_lo, checksum]`, where the
/// top bit of `temperature_hi` is the sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; 5],
}

impl Frame {
    /// Builds a frame from raw bytes, rejecting it if the checksum does not match.
    pub fn from_bytes(bytes: [u8; 5]) -> Result<Frame, DecodeFailure> {
        let expected = checksum(&[bytes[0], bytes[1], bytes[2], bytes[3]]);
        if bytes[4] != expected {
            return Err(DecodeFailure::ChecksumMismatch {
                expected,
                actual: bytes[4],
            });
        }
        Ok(Frame { bytes })
    }

    /// Builds a frame from its four payload bytes, computing the checksum.
    pub fn from_payload(payload: [u8; 4]) -> Frame {
        Frame {
            bytes: [
                payload[0],
                payload[1],
                payload[2],
                payload[3],
                checksum(&payload),
            ],
        }
    }

    pub fn bytes(&self) -> [u8; 5] {
        self.bytes
    }

    pub fn humidity_x10(&self) -> u16 {
        ((self.bytes[0] as u16) << 8) | self.bytes[1] as u16
    }

    /// Raw sign-magnitude temperature: bit 15 is the sign.
    pub fn temperature_x10(&self) -> u16 {
        ((self.bytes[2] as u16) << 8) | self.bytes[3] as u16
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f32 {
        self.humidity_x10() as f32 / 10.0
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f32 {
        let result = (self.temperature_x10() & 0x7FFF) as f32 / 10.0;
        if (self.temperature_x10() & 0x8000) != 0 {
            return -result;
        }
        result
    }
}

/// Low byte of the sum of the payload bytes.
pub fn checksum(payload: &[u8; 4]) -> u8 {
    let sum: u16 = payload.iter().map(|byte| *byte as u16).sum();
    sum.to_be_bytes()[1]
}

/// Turns a capture into a verified frame.
///
/// Each data pulse contributes one bit, most significant bit first. Pulses past the fortieth are
/// ignored.
pub fn decode(record: &TransitionRecord) -> Result<Frame, DecodeFailure> {
    let mut bytes = [0u8; 5];
    let mut bits = 0usize;
    for pulse in record.data_pulses().take(FRAME_BITS) {
        let byte = &mut bytes[bits / 8];
        *byte <<= 1;
        if pulse.ticks > ONE_BIT_THRESHOLD {
            *byte |= 1;
        }
        bits += 1;
    }

    if bits < FRAME_BITS {
        return Err(DecodeFailure::TooFewBits { bits });
    }
    Frame::from_bytes(bytes)
}
