//! # Telemetry Pipeline
//!
//! Drives each radio payload through decode → interpret → gate → format →
//! publish.
//!
//! [`Pipeline::on_packets_available`] is the event handler the receiver side
//! calls whenever payloads are pending. It drains the receiver completely
//! before returning; the only state kept between calls is the gate's last
//! accepted timestamp.
//!
//! ## Concurrency
//!
//! The gate lives behind a mutex that is held only for the accept decision,
//! so overlapping drains (e.g. a second delivery event while the first is
//! still running) can never both accept against the same reference time.
//! Decode, interpret and format are pure; the publish hand-off is
//! non-blocking and its failures never affect later packets.

use std::ops::AddAssign;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub use crate::clock::{Clock, SystemClock};
use crate::packet::decoder::decode;
use crate::publisher::Publisher;
use crate::receiver::PacketReceiver;
use crate::sample::gate::SampleGate;
use crate::sample::interpreter::interpret;
use crate::telemetry::formatter::{format, format_console_line};

/// Outcome counts for one or more drains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Payloads taken from the receiver
    pub packets: u64,
    /// Payloads skipped because they failed to decode
    pub decode_errors: u64,
    /// Samples dropped by the gate
    pub rejected: u64,
    /// Messages handed off to the publisher
    pub published: u64,
    /// Hand-offs the publisher reported as failed
    pub publish_failures: u64,
}

impl AddAssign for DrainReport {
    fn add_assign(&mut self, other: Self) {
        self.packets += other.packets;
        self.decode_errors += other.decode_errors;
        self.rejected += other.rejected;
        self.published += other.published;
        self.publish_failures += other.publish_failures;
    }
}

/// The decode → interpret → gate → format → publish pipeline
pub struct Pipeline<P, C = SystemClock> {
    publisher: P,
    clock: C,
    topic: String,
    gate: Mutex<SampleGate>,
}

impl<P, C> std::fmt::Debug for Pipeline<P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("topic", &self.topic)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl<P: Publisher, C: Clock> Pipeline<P, C> {
    /// Create a pipeline
    ///
    /// # Arguments
    ///
    /// * `publisher` - Destination for accepted samples
    /// * `clock` - Time source for capture and formatting
    /// * `topic` - Topic every message is published on
    /// * `gate` - Debounce gate (owned exclusively by the pipeline)
    pub fn new(publisher: P, clock: C, topic: impl Into<String>, gate: SampleGate) -> Self {
        Self {
            publisher,
            clock,
            topic: topic.into(),
            gate: Mutex::new(gate),
        }
    }

    /// Drain every pending payload from `receiver`
    ///
    /// Payloads are processed in the order the receiver yields them. Decode
    /// failures and publish failures are logged and skipped.
    ///
    /// # Returns
    ///
    /// * `DrainReport` - What happened to the payloads drained by this call
    pub fn on_packets_available<R>(&self, receiver: &mut R) -> DrainReport
    where
        R: PacketReceiver + ?Sized,
    {
        let mut report = DrainReport::default();

        while let Some(packet) = receiver.next_packet() {
            let captured_at = self.clock.now();
            report.packets += 1;
            self.process(&packet, captured_at, &mut report);
        }

        if report.packets > 0 {
            debug!(
                "Drained {} packets ({} published, {} rejected, {} malformed)",
                report.packets, report.published, report.rejected, report.decode_errors
            );
        }

        report
    }

    fn process(&self, packet: &[u8], captured_at: DateTime<Utc>, report: &mut DrainReport) {
        let raw = match decode(packet) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Dropping malformed packet: {}", e);
                report.decode_errors += 1;
                return;
            }
        };

        let sample = interpret(&raw, captured_at);

        let accepted = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .should_accept(&sample);

        if !accepted {
            report.rejected += 1;
            return;
        }

        info!("Sample {}", format_console_line(&sample));

        let message = format(&sample, &self.topic, &self.clock);

        match self.publisher.send(&message.topic, &message.payload) {
            Ok(()) => {
                debug!("Published to {}: {}", message.topic, message.payload);
                report.published += 1;
            }
            Err(e) => {
                warn!("Failed to publish sample: {}", e);
                report.publish_failures += 1;
            }
        }
    }

    /// Timestamp of the last sample the gate accepted
    pub fn last_accepted(&self) -> Option<DateTime<Utc>> {
        self.gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_accepted()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}
