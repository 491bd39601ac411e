//! Scripted byte streams standing in for live serial channels.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use common::AcquireError;
use capture_rs::ports::{ByteStream, ChannelOpener};

/// A byte stream that replays a fixed script.
///
/// By default the stream ends (reads return 0) once the script is
/// exhausted. `looping` replays the script forever, `holding_open` blocks
/// forever at exhaustion instead of ending, and `with_pause` inserts a
/// one-shot delay before the read that starts at a given byte index, which
/// lets a test end a wall-clock detection window at an exact offset.
#[derive(Clone)]
pub struct ScriptedChannel {
    path: String,
    script: Vec<u8>,
    cursor: usize,
    chunk: Option<usize>,
    looping: bool,
    hold_open: bool,
    pause: Option<(usize, Duration)>,
}

impl ScriptedChannel {
    pub fn new(path: &str, script: Vec<u8>) -> Self {
        Self {
            path: path.to_string(),
            script,
            cursor: 0,
            chunk: None,
            looping: false,
            hold_open: false,
            pause: None,
        }
    }

    /// Caps every read at `n` bytes, forcing `read_exact` to iterate.
    pub fn with_chunk(mut self, n: usize) -> Self {
        self.chunk = Some(n);
        self
    }

    /// Replays the script forever instead of ending at exhaustion.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Blocks forever at exhaustion instead of ending the stream.
    pub fn holding_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Delays the read that would start at byte index `at` by `pause`,
    /// once.
    pub fn with_pause(mut self, at: usize, pause: Duration) -> Self {
        self.pause = Some((at, pause));
        self
    }

    fn fresh(&self) -> Self {
        let mut copy = self.clone();
        copy.cursor = 0;
        copy
    }
}

#[async_trait]
impl ByteStream for ScriptedChannel {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, AcquireError> {
        if buf.is_empty() || self.script.is_empty() {
            return Ok(0);
        }

        if let Some((at, pause)) = self.pause {
            if self.cursor == at {
                // Taken once; clear before sleeping so a cancelled read
                // does not re-arm it.
                self.pause = None;
                tokio::time::sleep(pause).await;
            }
        }

        if self.cursor >= self.script.len() {
            if self.looping {
                self.cursor = 0;
            } else if self.hold_open {
                std::future::pending::<()>().await;
                unreachable!();
            } else {
                return Ok(0);
            }
        }

        let available = self.script.len() - self.cursor;
        let mut n = buf.len().min(available);
        if let Some(chunk) = self.chunk {
            n = n.min(chunk);
        }
        buf[..n].copy_from_slice(&self.script[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Opens fresh scripted channels by path; unknown paths fail the way a
/// missing serial device would.
#[derive(Default)]
pub struct ScriptedOpener {
    templates: HashMap<String, ScriptedChannel>,
    hold_open: bool,
}

impl ScriptedOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, path: &str, script: Vec<u8>) -> Self {
        self.templates
            .insert(path.to_string(), ScriptedChannel::new(path, script));
        self
    }

    pub fn with_channel(mut self, channel: ScriptedChannel) -> Self {
        self.templates
            .insert(channel.path.clone(), channel);
        self
    }

    /// Every opened channel holds the link open at script exhaustion.
    pub fn holding_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

#[async_trait]
impl ChannelOpener for ScriptedOpener {
    async fn open(
        &self,
        path: &str,
        _baud_rate: u32,
    ) -> Result<Box<dyn ByteStream>, AcquireError> {
        let template = self.templates.get(path).ok_or_else(|| {
            AcquireError::ChannelUnavailable(format!("{}: no such device", path))
        })?;
        let mut channel = template.fresh();
        channel.hold_open = channel.hold_open || self.hold_open;
        Ok(Box::new(channel))
    }
}

/// Builds a clean stream of `samples` 2-byte samples, each led by
/// `start_byte`, the payload cycling through `payloads`.
pub fn framed_stream(start_byte: u8, payloads: &[u8], samples: usize) -> Vec<u8> {
    let mut stream = Vec::with_capacity(samples * 2);
    for i in 0..samples {
        stream.push(start_byte);
        stream.push(payloads[i % payloads.len()]);
    }
    stream
}

/// Builds a framed stream with random payloads and a stray random byte
/// injected every `jitter_every` samples, the kind of noise a flaky link
/// produces. The marker still dominates the byte histogram.
pub fn noisy_stream(start_byte: u8, samples: usize, jitter_every: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut stream = Vec::with_capacity(samples * 2 + samples / jitter_every.max(1));
    for i in 0..samples {
        stream.push(start_byte);
        stream.push(rng.gen());
        if jitter_every > 0 && i % jitter_every == jitter_every - 1 {
            stream.push(rng.gen());
        }
    }
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chunked_reads_force_read_exact_to_iterate() {
        let mut channel =
            ScriptedChannel::new("/dev/ttyUSB0", (0..=9u8).collect()).with_chunk(3);
        let mut buf = [0u8; 10];
        channel.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn test_exhausted_script_ends_stream() {
        let mut channel = ScriptedChannel::new("/dev/ttyUSB0", vec![1, 2]);
        let mut buf = [0u8; 4];
        let result = channel.read_exact(&mut buf).await;
        assert!(matches!(result, Err(AcquireError::ChannelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_looping_replays_script() {
        let mut channel = ScriptedChannel::new("/dev/ttyUSB0", vec![1, 2]).looping();
        let mut buf = [0u8; 6];
        channel.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 1, 2, 1, 2]);
    }

    #[tokio::test]
    async fn test_opener_rejects_unknown_path() {
        let opener = ScriptedOpener::new().with_script("/dev/ttyUSB0", vec![1]);
        let result = opener.open("/dev/ttyUSB9", 375_000).await;
        assert!(matches!(result, Err(AcquireError::ChannelUnavailable(_))));
    }

    #[test]
    fn test_framed_stream_shape() {
        let stream = framed_stream(0x7e, &[0x10, 0x20], 3);
        assert_eq!(stream, vec![0x7e, 0x10, 0x7e, 0x20, 0x7e, 0x10]);
    }
}
