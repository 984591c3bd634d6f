//! # Sample Interpreter
//!
//! Converts raw readings into Fahrenheit samples.

use chrono::{DateTime, Utc};

use crate::packet::protocol::RawReading;

/// Raw temperatures are reported in tenths of a degree
const RAW_TEMP_SCALE: f64 = 10.0;

/// A reading in engineering units
///
/// `None` means the probe for that channel is unplugged. A present channel
/// may legitimately read 0.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpretedSample {
    /// Moment the packet was read from the receiver
    pub timestamp: DateTime<Utc>,

    /// Channel 1 ("air") temperature in Fahrenheit
    pub temp1: Option<f64>,

    /// Channel 2 ("meat") temperature in Fahrenheit
    pub temp2: Option<f64>,
}

/// Convert Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Interpret a raw reading captured at `captured_at`
///
/// # Arguments
///
/// * `raw` - Decoded raw reading
/// * `captured_at` - Moment the packet was read from the receiver
///
/// # Returns
///
/// * `InterpretedSample` - Channels in Fahrenheit, absent where the probe is unplugged
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use smoker_bridge::packet::protocol::RawReading;
/// use smoker_bridge::sample::interpreter::interpret;
///
/// let raw = RawReading { temp1: 250, probe2: 1, ..Default::default() };
/// let sample = interpret(&raw, Utc::now());
/// assert_eq!(sample.temp1, Some(77.0));
/// assert_eq!(sample.temp2, None);
/// ```
pub fn interpret(raw: &RawReading, captured_at: DateTime<Utc>) -> InterpretedSample {
    let fahrenheit = raw.is_fahrenheit();

    InterpretedSample {
        timestamp: captured_at,
        temp1: raw
            .probe1_connected()
            .then(|| channel_fahrenheit(raw.temp1, fahrenheit)),
        temp2: raw
            .probe2_connected()
            .then(|| channel_fahrenheit(raw.temp2, fahrenheit)),
    }
}

fn channel_fahrenheit(raw_temp: u16, already_fahrenheit: bool) -> f64 {
    let degrees = f64::from(raw_temp) / RAW_TEMP_SCALE;
    if already_fahrenheit {
        degrees
    } else {
        celsius_to_fahrenheit(degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EPSILON: f64 = 1e-9;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap()
    }

    fn assert_temp(actual: Option<f64>, expected: f64) {
        let value = actual.expect("channel should be present");
        assert!((value - expected).abs() < EPSILON, "expected {}, got {}", expected, value);
    }

    #[test]
    fn test_celsius_conversion() {
        let raw = RawReading { temp1: 250, probe1: 0, temp_is_fahrenheit: 0, ..Default::default() };
        let sample = interpret(&raw, at());
        assert_temp(sample.temp1, 77.0);
    }

    #[test]
    fn test_fahrenheit_passthrough() {
        let raw = RawReading { temp1: 770, probe1: 0, temp_is_fahrenheit: 1, ..Default::default() };
        let sample = interpret(&raw, at());
        assert_temp(sample.temp1, 77.0);
    }

    #[test]
    fn test_channel_two_absent_regardless_of_raw_bytes() {
        let raw = RawReading {
            temp1: 300,
            probe1: 0,
            temp2: 0xFFFF,
            probe2: 1,
            ..Default::default()
        };
        let sample = interpret(&raw, at());

        assert_temp(sample.temp1, 86.0);
        assert_eq!(sample.temp2, None);
    }

    #[test]
    fn test_channels_are_independent() {
        let raw = RawReading { temp1: 100, probe1: 5, temp2: 100, probe2: 0, ..Default::default() };
        let sample = interpret(&raw, at());

        assert_eq!(sample.temp1, None);
        assert_temp(sample.temp2, 50.0);
    }

    #[test]
    fn test_zero_is_not_absence() {
        let raw = RawReading { temp1: 0, probe1: 0, temp_is_fahrenheit: 1, probe2: 1, ..Default::default() };
        let sample = interpret(&raw, at());

        assert_eq!(sample.temp1, Some(0.0));
        assert_eq!(sample.temp2, None);
    }

    #[test]
    fn test_zero_celsius_is_freezing() {
        let raw = RawReading { temp2: 0, probe1: 1, probe2: 0, ..Default::default() };
        let sample = interpret(&raw, at());
        assert_temp(sample.temp2, 32.0);
    }

    #[test]
    fn test_tenths_are_kept() {
        let raw = RawReading { temp1: 1234, temp_is_fahrenheit: 1, ..Default::default() };
        let sample = interpret(&raw, at());
        assert_temp(sample.temp1, 123.4);
    }

    #[test]
    fn test_timestamp_is_capture_time() {
        let raw = RawReading::default();
        let sample = interpret(&raw, at());
        assert_eq!(sample.timestamp, at());
    }

    #[test]
    fn test_interpret_is_deterministic() {
        let raw = RawReading { temp1: 321, temp2: 654, ..Default::default() };
        assert_eq!(interpret(&raw, at()), interpret(&raw, at()));
    }
}
