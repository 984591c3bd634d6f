//! # Raw Reading Decoder
//!
//! Positional extraction of a [`RawReading`] from a radio payload.

use super::protocol::*;
use crate::error::DecodeError;

/// Decode one radio payload into a raw reading
///
/// The length is checked before any field is read, so a truncated or padded
/// buffer never yields a partial record. Field values are not validated.
///
/// # Arguments
///
/// * `bytes` - Radio payload (must be exactly 21 bytes)
///
/// # Returns
///
/// * `Result<RawReading, DecodeError>` - Decoded reading, or error if the length is wrong
///
/// # Examples
///
/// ```
/// use smoker_bridge::packet::decoder::decode;
///
/// let reading = decode(&[0u8; 21]).unwrap();
/// assert!(reading.probe1_connected());
/// assert!(decode(&[0u8; 20]).is_err());
/// ```
pub fn decode(bytes: &[u8]) -> Result<RawReading, DecodeError> {
    if bytes.len() != RAW_READING_SIZE {
        return Err(DecodeError::BadLength {
            expected: RAW_READING_SIZE,
            actual: bytes.len(),
        });
    }

    let mut reserved = [0u8; RESERVED_SIZE];
    reserved.copy_from_slice(&bytes[OFFSET_RESERVED..OFFSET_RESERVED + RESERVED_SIZE]);

    Ok(RawReading {
        temp1: read_u16_le(bytes, OFFSET_TEMP1),
        alarm_max1: read_u16_le(bytes, OFFSET_ALARM_MAX1),
        alarm_min1: read_u16_le(bytes, OFFSET_ALARM_MIN1),
        temp2: read_u16_le(bytes, OFFSET_TEMP2),
        alarm_max2: read_u16_le(bytes, OFFSET_ALARM_MAX2),
        alarm_min2: read_u16_le(bytes, OFFSET_ALARM_MIN2),
        alarm1_on: bytes[OFFSET_ALARM1_ON],
        probe1: bytes[OFFSET_PROBE1],
        alarm2_on: bytes[OFFSET_ALARM2_ON],
        probe2: bytes[OFFSET_PROBE2],
        temp_is_fahrenheit: bytes[OFFSET_TEMP_IS_FAHRENHEIT],
        reserved,
    })
}

fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::encoder::encode_raw_reading;
    use tokio_test::assert_ok;

    fn sample_reading() -> RawReading {
        RawReading {
            temp1: 0x1234,
            alarm_max1: 2000,
            alarm_min1: 100,
            temp2: 0xBEEF,
            alarm_max2: 1800,
            alarm_min2: 0,
            alarm1_on: 1,
            probe1: 0,
            alarm2_on: 0,
            probe2: 1,
            temp_is_fahrenheit: 0,
            reserved: [0xAA, 0xBB, 0xCC, 0xDD],
        }
    }

    #[test]
    fn test_decode_encoded_reading() {
        let reading = sample_reading();
        let bytes = encode_raw_reading(&reading);

        let decoded = assert_ok!(decode(&bytes));
        assert_eq!(decoded, reading);
    }

    #[test]
    fn test_decode_field_offsets() {
        let bytes: [u8; 21] = [
            0x34, 0x12, // temp1 = 0x1234
            0xD0, 0x07, // alarm_max1 = 2000
            0x64, 0x00, // alarm_min1 = 100
            0xEF, 0xBE, // temp2 = 0xBEEF
            0x08, 0x07, // alarm_max2 = 1800
            0x00, 0x00, // alarm_min2 = 0
            0x01, // alarm1_on
            0x00, // probe1
            0x00, // alarm2_on
            0x01, // probe2
            0x00, // temp_is_fahrenheit
            0xAA, 0xBB, 0xCC, 0xDD, // reserved
        ];

        let decoded = assert_ok!(decode(&bytes));
        assert_eq!(decoded, sample_reading());
    }

    #[test]
    fn test_decode_is_little_endian() {
        let mut bytes = [0u8; RAW_READING_SIZE];
        bytes[OFFSET_TEMP1] = 0xFA;
        bytes[OFFSET_TEMP1 + 1] = 0x00;

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.temp1, 250);
    }

    #[test]
    fn test_decode_does_not_validate_values() {
        let bytes = [0xFFu8; RAW_READING_SIZE];
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.temp1, u16::MAX);
        assert_eq!(decoded.alarm_min2, u16::MAX);
        assert_eq!(decoded.probe2, 0xFF);
    }

    #[test]
    fn test_decode_too_short() {
        let result = decode(&[0u8; 20]);
        assert_eq!(result, Err(DecodeError::BadLength { expected: 21, actual: 20 }));
    }

    #[test]
    fn test_decode_too_long() {
        let result = decode(&[0u8; 32]);
        assert_eq!(result, Err(DecodeError::BadLength { expected: 21, actual: 32 }));
    }

    #[test]
    fn test_decode_empty() {
        let result = decode(&[]);
        assert_eq!(result, Err(DecodeError::BadLength { expected: 21, actual: 0 }));
    }

    #[test]
    fn test_bad_length_message() {
        let err = decode(&[0u8; 5]).unwrap_err();
        assert_eq!(err.to_string(), "bad packet length: expected 21 bytes, got 5");
    }
}
