//! # Sample Module
//!
//! Turns raw readings into Fahrenheit samples and debounces them.

pub mod interpreter;
pub mod gate;
