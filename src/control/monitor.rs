//! # Topic Monitor
//!
//! Echoes every broker message under a topic filter to the log, one line per
//! message:
//!
//! ```text
//! 1720094400|smoker/temperature|{"date":"2024-07-04","timestamp":"1720094400","air":86.0}
//! ```
//!
//! The leading field is the epoch second the message was received.

use chrono::{DateTime, Utc};
use rumqttc::matches;
use tracing::info;

use crate::clock::{Clock, SystemClock};

/// Filter covering every smoker topic
pub const DEFAULT_MONITOR_FILTER: &str = "smoker/#";

/// Render `<epoch seconds>|<topic>|<payload>`
///
/// Payload bytes that are not UTF-8 are replaced.
pub fn format_topic_line(received_at: DateTime<Utc>, topic: &str, payload: &[u8]) -> String {
    format!(
        "{}|{}|{}",
        received_at.timestamp(),
        topic,
        String::from_utf8_lossy(payload)
    )
}

/// Logs messages whose topic matches a filter
#[derive(Debug)]
pub struct TopicMonitor<C = SystemClock> {
    filter: String,
    clock: C,
    seen: u64,
}

impl<C: Clock> TopicMonitor<C> {
    pub fn new(filter: impl Into<String>, clock: C) -> Self {
        Self {
            filter: filter.into(),
            clock,
            seen: 0,
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Log one message if its topic matches the filter
    ///
    /// # Returns
    ///
    /// * `Option<String>` - The logged line, or `None` if the topic did not match
    pub fn handle(&mut self, topic: &str, payload: &[u8]) -> Option<String> {
        if !matches(topic, &self.filter) {
            return None;
        }

        let line = format_topic_line(self.clock.now(), topic, payload);
        info!(target: "monitor", "{}", line);
        self.seen += 1;
        Some(line)
    }

    /// Messages logged so far
    pub fn seen(&self) -> u64 {
        self.seen
    }
}
