//! # Fan Commands
//!
//! The smoker's blower is driven by a PWM output whose duty cycle is set
//! remotely. A command is the duty cycle in percent as a plain decimal
//! integer, published on [`FAN_COMMAND_TOPIC`]:
//!
//! ```text
//! smoker/fan/cmd  <-  "40"
//! ```
//!
//! Payloads that are not an integer in `0..=100` are logged and ignored; the
//! output keeps its previous duty cycle.

use tracing::{debug, error, info, warn};

use crate::error::{FanCommandError, Result};

/// Topic fan commands are published on
pub const FAN_COMMAND_TOPIC: &str = "smoker/fan/cmd";

/// Largest accepted duty cycle (percent)
pub const MAX_DUTY: u8 = 100;

/// Actuator the fan duty cycle is applied to
#[cfg_attr(test, mockall::automock)]
pub trait FanOutput {
    /// Set the duty cycle in percent (`0..=100`)
    ///
    /// # Errors
    ///
    /// Returns error if the hardware rejects the new setting
    fn set_duty(&mut self, percent: u8) -> Result<()>;
}

impl<F: FanOutput + ?Sized> FanOutput for Box<F> {
    fn set_duty(&mut self, percent: u8) -> Result<()> {
        (**self).set_duty(percent)
    }
}

/// Parse a fan command payload into a duty cycle
///
/// Surrounding whitespace and a leading sign are accepted.
///
/// # Examples
///
/// ```
/// use smoker_bridge::control::fan::parse_duty;
///
/// assert_eq!(parse_duty(b"40\n"), Ok(40));
/// assert!(parse_duty(b"fast").is_err());
/// assert!(parse_duty(b"101").is_err());
/// ```
pub fn parse_duty(payload: &[u8]) -> std::result::Result<u8, FanCommandError> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| FanCommandError::NotANumber(String::from_utf8_lossy(payload).into_owned()))?
        .trim();

    let value: i64 = text
        .parse()
        .map_err(|_| FanCommandError::NotANumber(text.to_string()))?;

    u8::try_from(value)
        .ok()
        .filter(|duty| *duty <= MAX_DUTY)
        .ok_or(FanCommandError::OutOfRange(value))
}

/// Fan command counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanStats {
    /// Commands applied to the output
    pub applied: u64,
    /// Payloads that were not a valid duty cycle
    pub rejected: u64,
    /// Valid commands the output failed to apply
    pub output_failures: u64,
}

/// Applies fan commands to a [`FanOutput`]
pub struct FanController<F> {
    output: F,
    topic: String,
    duty: Option<u8>,
    stats: FanStats,
}

impl<F: FanOutput> FanController<F> {
    /// Create a controller
    ///
    /// # Arguments
    ///
    /// * `output` - PWM output driving the fan
    /// * `topic` - Topic the commands arrive on
    pub fn new(output: F, topic: impl Into<String>) -> Self {
        Self {
            output,
            topic: topic.into(),
            duty: None,
            stats: FanStats::default(),
        }
    }

    /// Apply one command payload
    ///
    /// # Returns
    ///
    /// * `bool` - Whether the output now runs at the commanded duty cycle
    pub fn handle(&mut self, payload: &[u8]) -> bool {
        debug!("Fan command: {}", String::from_utf8_lossy(payload));

        let duty = match parse_duty(payload) {
            Ok(duty) => duty,
            Err(e) => {
                warn!("Fan command error: {}", e);
                self.stats.rejected += 1;
                return false;
            }
        };

        match self.output.set_duty(duty) {
            Ok(()) => {
                info!("Fan duty cycle set to {}%", duty);
                self.duty = Some(duty);
                self.stats.applied += 1;
                true
            }
            Err(e) => {
                error!("Failed to set fan duty cycle to {}%: {}", duty, e);
                self.stats.output_failures += 1;
                false
            }
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Last duty cycle successfully applied by a command
    pub fn duty(&self) -> Option<u8> {
        self.duty
    }

    pub fn stats(&self) -> FanStats {
        self.stats
    }
}
