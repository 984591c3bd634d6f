//! # Raw Reading Layout
//!
//! Byte layout of the thermometer's radio payload. All multi-byte fields are
//! little-endian.
//!
//! ```text
//! Offset  Size  Field
//!  0      2     temp1 (tenths of a degree)
//!  2      2     alarm_max1
//!  4      2     alarm_min1
//!  6      2     temp2 (tenths of a degree)
//!  8      2     alarm_max2
//! 10      2     alarm_min2
//! 12      1     alarm1_on
//! 13      1     probe1 (0 = connected)
//! 14      1     alarm2_on
//! 15      1     probe2 (0 = connected)
//! 16      1     temp_is_fahrenheit
//! 17      4     reserved
//! ```

/// Size of one raw reading on the air (bytes)
pub const RAW_READING_SIZE: usize = 21;

pub const OFFSET_TEMP1: usize = 0;
pub const OFFSET_ALARM_MAX1: usize = 2;
pub const OFFSET_ALARM_MIN1: usize = 4;
pub const OFFSET_TEMP2: usize = 6;
pub const OFFSET_ALARM_MAX2: usize = 8;
pub const OFFSET_ALARM_MIN2: usize = 10;
pub const OFFSET_ALARM1_ON: usize = 12;
pub const OFFSET_PROBE1: usize = 13;
pub const OFFSET_ALARM2_ON: usize = 14;
pub const OFFSET_PROBE2: usize = 15;
pub const OFFSET_TEMP_IS_FAHRENHEIT: usize = 16;
pub const OFFSET_RESERVED: usize = 17;

/// Number of trailing reserved bytes
pub const RESERVED_SIZE: usize = 4;

/// Probe status byte value meaning "probe connected"
pub const PROBE_CONNECTED: u8 = 0;

/// One packet as reported by the thermometer, before unit interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawReading {
    /// Channel 1 temperature, tenths of a degree
    pub temp1: u16,
    pub alarm_max1: u16,
    pub alarm_min1: u16,

    /// Channel 2 temperature, tenths of a degree
    pub temp2: u16,
    pub alarm_max2: u16,
    pub alarm_min2: u16,

    pub alarm1_on: u8,

    /// Channel 1 probe status (0 = connected)
    pub probe1: u8,

    pub alarm2_on: u8,

    /// Channel 2 probe status (0 = connected)
    pub probe2: u8,

    /// Nonzero when temperatures are already Fahrenheit tenths
    pub temp_is_fahrenheit: u8,

    pub reserved: [u8; RESERVED_SIZE],
}

impl RawReading {
    /// Whether the channel 1 probe is plugged in
    pub fn probe1_connected(&self) -> bool {
        self.probe1 == PROBE_CONNECTED
    }

    /// Whether the channel 2 probe is plugged in
    pub fn probe2_connected(&self) -> bool {
        self.probe2 == PROBE_CONNECTED
    }

    pub fn is_fahrenheit(&self) -> bool {
        self.temp_is_fahrenheit != 0
    }
}
