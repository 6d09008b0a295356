//! The [`Device`] trait and the transports that implement it.

mod file;
mod serial;

pub use file::FileDevice;
pub use serial::{DATA_BITS, DEFAULT_BAUD_RATE, PARITY, STOP_BITS, SerialDevice};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A byte-oriented transport that accepts whole lines and may produce output.
///
/// The engine owns exactly one device for a run and calls it sequentially.
#[async_trait(?Send)]
pub trait Device {
    /// Write `line` followed by the transport's line terminator.
    async fn write_line(&mut self, line: &[u8]) -> Result<()>;

    /// Collect output for up to `timeout`. Returns whatever arrived, possibly
    /// nothing. Transports that cannot read fail with
    /// [`Error::UnsupportedOperation`](crate::Error::UnsupportedOperation).
    async fn read_timeout(&mut self, timeout: Duration) -> Result<Vec<u8>>;

    /// Release the transport. Call once.
    async fn close(&mut self) -> Result<()>;
}

/// Which transport [`open`] should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Append lines to a file; nothing is ever read back.
    File,
    /// Talk to a serial port at the given baud rate.
    Serial { baud_rate: u32 },
}

/// Open `target` as the given kind of device.
pub async fn open(target: &str, kind: DeviceKind) -> Result<Box<dyn Device>> {
    let device: Box<dyn Device> = match kind {
        DeviceKind::File => Box::new(FileDevice::open(target).await?),
        DeviceKind::Serial { baud_rate } => Box::new(SerialDevice::open(target, baud_rate)?),
    };
    tracing::info!(device = target, ?kind, "device opened");
    Ok(device)
}
