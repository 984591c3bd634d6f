//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, SmokerBridgeError};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub receiver: ReceiverConfig,
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub fan: FanConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Radio bridge serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    #[serde(default = "default_receiver_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// Message broker configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MqttConfig {
    #[serde(default = "default_mqtt_host")]
    pub host: String,

    #[serde(default = "default_mqtt_port")]
    pub port: u16,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default = "default_keep_alive_s")]
    pub keep_alive_s: u64,
}

/// Debounce configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GateConfig {
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

/// Log output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Directory for rolling log files (stdout only when unset)
    #[serde(default)]
    pub directory: Option<String>,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

/// Fan command configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FanConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_fan_command_topic")]
    pub command_topic: String,

    /// PWM chip directory under sysfs
    #[serde(default = "default_pwm_chip")]
    pub pwm_chip: String,

    #[serde(default)]
    pub pwm_channel: u32,

    #[serde(default = "default_fan_frequency_hz")]
    pub frequency_hz: u32,

    /// Duty cycle (percent) applied at startup
    #[serde(default = "default_initial_duty")]
    pub initial_duty: u8,
}

/// Topic monitor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_monitor_filter")]
    pub filter: String,
}

// Default value functions
fn default_receiver_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_queue_capacity() -> usize { 64 }

fn default_mqtt_host() -> String { "localhost".to_string() }
fn default_mqtt_port() -> u16 { 1883 }
fn default_client_id() -> String { "smoker-bridge".to_string() }
fn default_topic() -> String { crate::telemetry::formatter::DEFAULT_TOPIC.to_string() }
fn default_keep_alive_s() -> u64 { 60 }

fn default_min_interval_ms() -> u64 { crate::sample::gate::DEFAULT_MIN_INTERVAL_MS }

fn default_file_prefix() -> String { "smoker-bridge.log".to_string() }

fn default_fan_command_topic() -> String { crate::control::fan::FAN_COMMAND_TOPIC.to_string() }
fn default_pwm_chip() -> String { "/sys/class/pwm/pwmchip0".to_string() }
fn default_fan_frequency_hz() -> u32 { 50 }
fn default_initial_duty() -> u8 { 50 }

fn default_monitor_filter() -> String { crate::control::monitor::DEFAULT_MONITOR_FILTER.to_string() }

/// Baud rates the radio bridge firmware supports
const SUPPORTED_BAUD_RATES: [u32; 6] = [9600, 57600, 115200, 230400, 460800, 921600];

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            port: default_receiver_port(),
            baud_rate: default_baud_rate(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_mqtt_host(),
            port: default_mqtt_port(),
            client_id: default_client_id(),
            topic: default_topic(),
            keep_alive_s: default_keep_alive_s(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { min_interval_ms: default_min_interval_ms() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command_topic: default_fan_command_topic(),
            pwm_chip: default_pwm_chip(),
            pwm_channel: 0,
            frequency_hz: default_fan_frequency_hz(),
            initial_duty: default_initial_duty(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: default_monitor_filter(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use smoker_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.receiver.port.is_empty() {
            return Err(invalid("receiver port cannot be empty"));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.receiver.baud_rate) {
            return Err(invalid(
                "baud_rate must be one of: 9600, 57600, 115200, 230400, 460800, 921600",
            ));
        }

        if self.receiver.queue_capacity == 0 || self.receiver.queue_capacity > 4096 {
            return Err(invalid("queue_capacity must be between 1 and 4096"));
        }

        if self.mqtt.host.is_empty() {
            return Err(invalid("mqtt host cannot be empty"));
        }

        if self.mqtt.port == 0 {
            return Err(invalid("mqtt port must be greater than 0"));
        }

        if self.mqtt.client_id.is_empty() {
            return Err(invalid("mqtt client_id cannot be empty"));
        }

        // Publish topics may not contain subscription wildcards
        if self.mqtt.topic.is_empty() || self.mqtt.topic.contains(['+', '#']) {
            return Err(invalid("mqtt topic must be non-empty and contain no '+' or '#'"));
        }

        if self.mqtt.keep_alive_s == 0 || self.mqtt.keep_alive_s > 3600 {
            return Err(invalid("keep_alive_s must be between 1 and 3600"));
        }

        if self.gate.min_interval_ms == 0 {
            return Err(invalid("min_interval_ms must be greater than 0"));
        }

        if let Some(dir) = &self.logging.directory {
            if dir.is_empty() {
                return Err(invalid("logging directory cannot be empty when set"));
            }
            if self.logging.file_prefix.is_empty() {
                return Err(invalid("logging file_prefix cannot be empty"));
            }
        }

        if self.fan.command_topic.is_empty() || self.fan.command_topic.contains(['+', '#']) {
            return Err(invalid("fan command_topic must be non-empty and contain no '+' or '#'"));
        }

        if self.fan.pwm_chip.is_empty() {
            return Err(invalid("fan pwm_chip cannot be empty"));
        }

        if self.fan.frequency_hz == 0 || self.fan.frequency_hz > 1_000_000 {
            return Err(invalid("fan frequency_hz must be between 1 and 1000000"));
        }

        if self.fan.initial_duty > crate::control::fan::MAX_DUTY {
            return Err(invalid("fan initial_duty must be between 0 and 100"));
        }

        if !rumqttc::valid_filter(&self.monitor.filter) {
            return Err(invalid("monitor filter is not a valid topic filter"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> SmokerBridgeError {
    SmokerBridgeError::Config(toml::de::Error::custom(msg))
}
