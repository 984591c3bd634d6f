//! # Thermometer Packet Module
//!
//! Binary layout of the wireless thermometer's radio payload.
//!
//! This module handles:
//! - Layout constants and the `RawReading` record
//! - Length-checked positional decoding (little-endian fields)
//! - Encoding readings back into payloads for fixtures

pub mod protocol;
pub mod decoder;
pub mod encoder;
