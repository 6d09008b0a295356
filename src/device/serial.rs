use super::Device;
use crate::error::Result;
use crate::line_pump::{LinePump, spawn_line_pump};
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DATA_BITS: DataBits = DataBits::Eight;
pub const PARITY: Parity = Parity::None;
pub const STOP_BITS: StopBits = StopBits::One;

/// An active transport: lines go out through the write half, and a
/// [`LinePump`] owns the read half for the lifetime of the device.
pub struct SerialDevice<W = WriteHalf<SerialStream>> {
    writer: Option<W>,
    pump: LinePump,
}

impl SerialDevice {
    /// Open the serial port at `path` with 8N1 framing.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let stream = tokio_serial::new(path, baud_rate)
            .data_bits(DATA_BITS)
            .parity(PARITY)
            .stop_bits(STOP_BITS)
            .flow_control(FlowControl::None)
            .open_native_async()
            .map_err(io::Error::from)?;
        Ok(Self::from_stream(stream))
    }
}

impl<S> SerialDevice<WriteHalf<S>>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wrap an already open byte stream, handing its read half to a line pump.
    pub fn from_stream(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            writer: Some(writer),
            pump: spawn_line_pump(reader),
        }
    }
}

impl<W: AsyncWrite + Unpin> SerialDevice<W> {
    fn writer(&mut self) -> Result<&mut W> {
        self.writer.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "serial device is closed").into()
        })
    }
}

#[async_trait(?Send)]
impl<W: AsyncWrite + Unpin> Device for SerialDevice<W> {
    async fn write_line(&mut self, line: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(line.len() + 1);
        frame.extend_from_slice(line);
        frame.push(b'\r');

        let writer = self.writer()?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_timeout(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        self.pump.read_timeout(timeout).await
    }

    async fn close(&mut self) -> Result<()> {
        self.pump.stop();
        if let Some(mut writer) = self.writer.take() {
            writer.shutdown().await?;
        }
        Ok(())
    }
}
