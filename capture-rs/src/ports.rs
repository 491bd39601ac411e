use async_trait::async_trait;

use common::AcquireError;

/// One open sensor channel as a raw byte stream.
///
/// A channel is owned exclusively by the operation that opened it and is
/// closed when the stream is dropped. Reads are the only suspension points
/// in the acquisition core.
#[async_trait]
pub trait ByteStream: Send {
    /// Reads at most `buf.len()` bytes into `buf`, returning the number of
    /// bytes read. `Ok(0)` means the stream has ended.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, AcquireError>;

    /// Reads exactly `buf.len()` bytes, blocking until the full count is
    /// available or the physical link closes.
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), AcquireError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(AcquireError::ChannelUnavailable(format!(
                    "{}: stream closed after {} of {} bytes",
                    self.path(),
                    filled,
                    buf.len()
                )));
            }
            filled += n;
        }
        Ok(())
    }

    /// The device path this stream was opened from.
    fn path(&self) -> &str;
}

/// Opens channels by device path.
///
/// The seam between the acquisition core and the physical transport; tests
/// inject scripted openers here.
#[async_trait]
pub trait ChannelOpener: Send + Sync {
    async fn open(&self, path: &str, baud_rate: u32)
        -> Result<Box<dyn ByteStream>, AcquireError>;
}
