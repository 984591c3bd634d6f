//! # Sample Gate
//!
//! Minimum-interval debounce. A sample is accepted only when strictly more
//! than the configured interval has passed since the last accepted sample.
//! Rejected samples are dropped, never queued.

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

use super::interpreter::InterpretedSample;

/// Default minimum interval between accepted samples (10 seconds)
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 10_000;

/// Debounce state
///
/// `last_accepted` is `None` until the first sample is accepted, which makes
/// the first candidate compare as infinitely late.
///
/// `should_accept` takes `&mut self`; callers sharing a gate between
/// concurrent drains must serialize access (the pipeline keeps it behind a
/// mutex) so the read-then-write is atomic.
#[derive(Debug, Clone)]
pub struct SampleGate {
    min_interval: Duration,
    last_accepted: Option<DateTime<Utc>>,
}

impl Default for SampleGate {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_MIN_INTERVAL_MS as i64))
    }
}

impl SampleGate {
    /// Create a gate with the given minimum interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    /// Create a gate from an interval in milliseconds
    pub fn from_millis(min_interval_ms: u64) -> Self {
        Self::new(Duration::milliseconds(
            i64::try_from(min_interval_ms).unwrap_or(i64::MAX),
        ))
    }

    /// Decide whether `candidate` passes the gate
    ///
    /// On acceptance the candidate's timestamp becomes the new reference
    /// before returning. On rejection nothing changes.
    pub fn should_accept(&mut self, candidate: &InterpretedSample) -> bool {
        let accept = match self.last_accepted {
            None => true,
            Some(last) => candidate.timestamp - last > self.min_interval,
        };

        if accept {
            self.last_accepted = Some(candidate.timestamp);
        } else {
            trace!("Gate rejected sample captured at {}", candidate.timestamp);
        }

        accept
    }

    /// Timestamp of the last accepted sample, if any
    pub fn last_accepted(&self) -> Option<DateTime<Utc>> {
        self.last_accepted
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
