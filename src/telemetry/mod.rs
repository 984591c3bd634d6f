//! # Telemetry Module
//!
//! Output formats for accepted samples.
//!
//! This module handles:
//! - JSON payloads for the broker (date, timestamp, air, meat)
//! - CSV log lines (capture epoch, air, meat)

pub mod formatter;
