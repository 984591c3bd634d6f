//! # Serial Radio Link
//!
//! The nRF24 transceiver sits behind a USB serial bridge that forwards every
//! radio payload as a frame:
//!
//! ```text
//! [0x7E sync] [length 0..=32] [payload ...]
//! ```
//!
//! The reader resynchronizes on the sync byte and hands every complete
//! payload to the packet queue, whatever its length. Length checking against
//! the thermometer layout happens in the decoder.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, warn};

use super::PacketSender;
use crate::error::{Result, SmokerBridgeError};

/// Frame sync byte emitted by the serial bridge
pub const FRAME_SYNC_BYTE: u8 = 0x7E;

/// Largest payload the radio can carry (bytes)
pub const MAX_RADIO_PAYLOAD: usize = 32;

/// Serial connection to the radio bridge
pub struct RadioSerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
}

impl std::fmt::Debug for RadioSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl RadioSerial {
    /// Open the radio bridge
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyACM0")
    /// * `baud_rate` - Serial baud rate
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| SmokerBridgeError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(Self {
            port,
            device_path: path.to_string(),
        })
    }

    /// Device path the bridge was opened at
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Read frames until the port closes, pushing payloads into `sender`
    pub async fn run(mut self, sender: PacketSender) -> Result<()> {
        read_frames(&mut self.port, &sender).await
    }
}

/// Read sync/length framed payloads from `reader` until end of stream
///
/// # Returns
///
/// * `Result<()>` - Ok at end of stream, error on I/O failure or closed queue
pub async fn read_frames<R>(reader: &mut R, sender: &PacketSender) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut skipped: u64 = 0;

    loop {
        let Some(byte) = eof_as_none(reader.read_u8().await)? else {
            return Ok(());
        };

        if byte != FRAME_SYNC_BYTE {
            skipped += 1;
            continue;
        }

        if skipped > 0 {
            debug!("Skipped {} bytes while resynchronizing", skipped);
            skipped = 0;
        }

        let Some(length) = eof_as_none(reader.read_u8().await)? else {
            return Ok(());
        };
        let length = length as usize;

        if length > MAX_RADIO_PAYLOAD {
            warn!("Discarding frame with invalid length {}", length);
            continue;
        }

        let mut payload = vec![0u8; length];
        if eof_as_none(reader.read_exact(&mut payload).await)?.is_none() {
            return Ok(());
        }

        debug!("Received radio payload ({} bytes)", length);
        sender.push(Bytes::from(payload))?;
    }
}

fn eof_as_none<T>(result: std::io::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}
