//! # Error Types
//!
//! Custom error types for Smoker Bridge using `thiserror`.

use thiserror::Error;

/// Packet decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer is not exactly one raw reading long
    #[error("bad packet length: expected {expected} bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },
}

/// Fan command payload errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FanCommandError {
    #[error("not an integer duty cycle: {0:?}")]
    NotANumber(String),

    #[error("duty cycle {0} outside 0..=100")]
    OutOfRange(i64),
}

/// Main error type for Smoker Bridge
#[derive(Debug, Error)]
pub enum SmokerBridgeError {
    /// Packet decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serial link errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Publish hand-off errors
    #[error("Publish error: {0}")]
    Publish(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Smoker Bridge
pub type Result<T> = std::result::Result<T, SmokerBridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_converts() {
        let err: SmokerBridgeError = DecodeError::BadLength { expected: 21, actual: 3 }.into();
        assert_eq!(
            err.to_string(),
            "Decode error: bad packet length: expected 21 bytes, got 3"
        );
    }

    #[test]
    fn test_fan_command_error_messages() {
        assert_eq!(
            FanCommandError::NotANumber("fast".to_string()).to_string(),
            r#"not an integer duty cycle: "fast""#
        );
        assert_eq!(FanCommandError::OutOfRange(150).to_string(), "duty cycle 150 outside 0..=100");
    }

    #[test]
    fn test_publish_error_message() {
        let err = SmokerBridgeError::Publish("request channel full".to_string());
        assert_eq!(err.to_string(), "Publish error: request channel full");
    }
}
