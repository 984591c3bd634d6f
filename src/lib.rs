//! # Smoker Bridge Library
//!
//! Forward wireless BBQ thermometer readings to an MQTT broker.
//!
//! This library provides the core functionality for decoding the thermometer's
//! radio payloads, converting them to Fahrenheit, debouncing them and
//! publishing them as JSON messages. It also applies fan duty-cycle commands
//! received from the broker and can echo a topic tree to the log.

pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod packet;
pub mod pipeline;
pub mod publisher;
pub mod receiver;
pub mod sample;
pub mod telemetry;
