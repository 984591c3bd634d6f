//! # Raw Reading Encoder
//!
//! Serializes a [`RawReading`] into the on-air layout. The bridge never
//! transmits readings itself; this is the inverse of the decoder, used to
//! build payloads for tests and fixtures.

use super::protocol::*;

/// Encode a raw reading into a 21-byte radio payload
///
/// # Examples
///
/// ```
/// use smoker_bridge::packet::encoder::encode_raw_reading;
/// use smoker_bridge::packet::protocol::RawReading;
///
/// let reading = RawReading { temp1: 250, ..Default::default() };
/// let bytes = encode_raw_reading(&reading);
/// assert_eq!(bytes.len(), 21);
/// assert_eq!(&bytes[0..2], &[0xFA, 0x00]);
/// ```
pub fn encode_raw_reading(reading: &RawReading) -> [u8; RAW_READING_SIZE] {
    let mut bytes = [0u8; RAW_READING_SIZE];

    write_u16_le(&mut bytes, OFFSET_TEMP1, reading.temp1);
    write_u16_le(&mut bytes, OFFSET_ALARM_MAX1, reading.alarm_max1);
    write_u16_le(&mut bytes, OFFSET_ALARM_MIN1, reading.alarm_min1);
    write_u16_le(&mut bytes, OFFSET_TEMP2, reading.temp2);
    write_u16_le(&mut bytes, OFFSET_ALARM_MAX2, reading.alarm_max2);
    write_u16_le(&mut bytes, OFFSET_ALARM_MIN2, reading.alarm_min2);

    bytes[OFFSET_ALARM1_ON] = reading.alarm1_on;
    bytes[OFFSET_PROBE1] = reading.probe1;
    bytes[OFFSET_ALARM2_ON] = reading.alarm2_on;
    bytes[OFFSET_PROBE2] = reading.probe2;
    bytes[OFFSET_TEMP_IS_FAHRENHEIT] = reading.temp_is_fahrenheit;
    bytes[OFFSET_RESERVED..].copy_from_slice(&reading.reserved);

    bytes
}

fn write_u16_le(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}
