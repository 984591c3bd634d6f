//! # Message Formatter
//!
//! Renders accepted samples into the JSON payload published to the broker,
//! and into the compact CSV line written to the log.
//!
//! ## Payload
//!
//! ```json
//! {"date":"2024-07-04","timestamp":"1720094400","air":225.5,"meat":160.0}
//! ```
//!
//! `date` and `timestamp` describe when the message was formatted, not when
//! the packet was captured. `air` and `meat` are omitted when the
//! corresponding probe is unplugged.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::clock::Clock;
use crate::sample::interpreter::InterpretedSample;

/// Topic every temperature message is published on
pub const DEFAULT_TOPIC: &str = "smoker/temperature";

/// A payload ready for the publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage {
    /// Destination topic
    pub topic: String,

    /// JSON payload
    pub payload: String,
}

#[derive(Debug, Serialize)]
struct TemperaturePayload {
    date: String,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    air: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meat: Option<f64>,
}

/// Format a sample, reading `date`/`timestamp` from `clock` in local time
pub fn format<C: Clock + ?Sized>(sample: &InterpretedSample, topic: &str, clock: &C) -> FormattedMessage {
    format_at(sample, topic, &clock.now().with_timezone(&Local))
}

/// Format a sample with an explicit formatting time
///
/// # Arguments
///
/// * `sample` - Accepted sample
/// * `topic` - Destination topic
/// * `now` - Formatting time, rendered as `date` (`%F`) and `timestamp` (epoch seconds)
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use smoker_bridge::sample::interpreter::InterpretedSample;
/// use smoker_bridge::telemetry::formatter::format_at;
///
/// let now = Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap();
/// let sample = InterpretedSample { timestamp: now, temp1: Some(86.0), temp2: None };
/// let message = format_at(&sample, "smoker/temperature", &now);
/// assert_eq!(
///     message.payload,
///     r#"{"date":"2024-07-04","timestamp":"1720094400","air":86.0}"#
/// );
/// ```
pub fn format_at<Tz>(sample: &InterpretedSample, topic: &str, now: &DateTime<Tz>) -> FormattedMessage
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let body = TemperaturePayload {
        date: now.format("%F").to_string(),
        timestamp: now.timestamp().to_string(),
        air: sample.temp1,
        meat: sample.temp2,
    };

    FormattedMessage {
        topic: topic.to_string(),
        payload: serde_json::to_string(&body).unwrap_or_default(),
    }
}

/// Render the log line `<capture epoch seconds>,<air>,<meat>`
///
/// Absent channels leave their field empty.
pub fn format_console_line(sample: &InterpretedSample) -> String {
    let air = sample.temp1.map(|t| t.to_string()).unwrap_or_default();
    let meat = sample.temp2.map(|t| t.to_string()).unwrap_or_default();
    format!("{},{},{}", sample.timestamp.timestamp(), air, meat)
}
