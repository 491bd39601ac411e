// Production transport: the sensor boards appear as serial devices and are
// read through tokio-serial.

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio_serial::SerialPortBuilderExt;

use common::AcquireError;

use crate::ports::{ByteStream, ChannelOpener};

/// One open serial channel.
pub struct SerialChannel {
    inner: tokio_serial::SerialStream,
    path: String,
}

#[async_trait]
impl ByteStream for SerialChannel {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, AcquireError> {
        self.inner
            .read(buf)
            .await
            .map_err(|e| AcquireError::Io(format!("{}: {}", self.path, e)))
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Opens serial channels at the requested baud rate.
pub struct SerialOpener;

#[async_trait]
impl ChannelOpener for SerialOpener {
    async fn open(
        &self,
        path: &str,
        baud_rate: u32,
    ) -> Result<Box<dyn ByteStream>, AcquireError> {
        log::info!("Opening serial channel {} at {} baud", path, baud_rate);
        let stream = tokio_serial::new(path, baud_rate)
            .open_native_async()
            .map_err(|e| AcquireError::ChannelUnavailable(format!("{}: {}", path, e)))?;
        Ok(Box::new(SerialChannel {
            inner: stream,
            path: path.to_string(),
        }))
    }
}
