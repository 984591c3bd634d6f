//! # Sysfs PWM Output
//!
//! Drives one channel of a Linux PWM controller through
//! `/sys/class/pwm/pwmchipN/pwmM`. The channel is exported on open if the
//! kernel has not exposed it yet.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::fan::{FanOutput, MAX_DUTY};
use crate::error::Result;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// One exported PWM channel
#[derive(Debug)]
pub struct SysfsPwm {
    channel_dir: PathBuf,
    period_ns: u64,
}

impl SysfsPwm {
    /// Export (if needed), configure and enable a PWM channel
    ///
    /// The duty cycle starts at 0 so the period can be changed safely.
    ///
    /// # Arguments
    ///
    /// * `chip` - PWM chip directory (e.g., "/sys/class/pwm/pwmchip0")
    /// * `channel` - Channel number on the chip
    /// * `frequency_hz` - PWM frequency
    ///
    /// # Errors
    ///
    /// Returns error if any sysfs attribute cannot be written
    pub fn open<P: AsRef<Path>>(chip: P, channel: u32, frequency_hz: u32) -> Result<Self> {
        let chip = chip.as_ref();
        let channel_dir = chip.join(format!("pwm{}", channel));

        if !channel_dir.exists() {
            debug!("Exporting PWM channel {} on {}", channel, chip.display());
            fs::write(chip.join("export"), channel.to_string())?;
        }

        let pwm = Self {
            channel_dir,
            period_ns: NANOS_PER_SECOND / u64::from(frequency_hz.max(1)),
        };

        pwm.write_attribute("duty_cycle", 0)?;
        pwm.write_attribute("period", pwm.period_ns)?;
        pwm.write_attribute("enable", 1)?;

        info!(
            "Fan PWM enabled at {} ({} Hz)",
            pwm.channel_dir.display(),
            frequency_hz
        );
        Ok(pwm)
    }

    pub fn period_ns(&self) -> u64 {
        self.period_ns
    }

    /// High time for a duty cycle in percent
    pub fn duty_cycle_ns(&self, percent: u8) -> u64 {
        self.period_ns * u64::from(percent.min(MAX_DUTY)) / 100
    }

    fn write_attribute(&self, name: &str, value: u64) -> Result<()> {
        fs::write(self.channel_dir.join(name), value.to_string())?;
        Ok(())
    }
}

impl FanOutput for SysfsPwm {
    fn set_duty(&mut self, percent: u8) -> Result<()> {
        self.write_attribute("duty_cycle", self.duty_cycle_ns(percent))
    }
}
