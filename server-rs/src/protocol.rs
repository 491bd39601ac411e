//! Wire protocol of the command socket.
//!
//! Every message is one frame: a big-endian u32 byte length followed by a
//! UTF-8 payload. Command tokens are bare words; request and response
//! payloads are JSON. Frames are capped so a corrupt length prefix cannot
//! drive an unbounded allocation.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use common::AcquireError;

/// Upper bound on a single frame's payload.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Final status frame of a preview session.
pub const STATUS_PLOT_COMPLETE: &str = "Plot complete.";

/// The commands a client can issue, one token per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Enumerate connected sensor boards.
    ListSensors,
    /// Calibrate the selected sensors.
    Calibrate,
    /// Stream a live preview of one channel.
    Plot,
    /// Run a capture session.
    Capture,
}

impl Command {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "lstsens" => Some(Self::ListSensors),
            "calsens" => Some(Self::Calibrate),
            "pltsens" => Some(Self::Plot),
            "stmsrmt" => Some(Self::Capture),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::ListSensors => "lstsens",
            Self::Calibrate => "calsens",
            Self::Plot => "pltsens",
            Self::Capture => "stmsrmt",
        }
    }
}

/// Writes one length-prefixed frame.
pub async fn write_frame<W>(conn: &mut W, payload: &str) -> Result<(), AcquireError>
where
    W: AsyncWrite + Unpin + Send,
{
    let bytes = payload.as_bytes();
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(AcquireError::Transport(format!(
            "frame of {} bytes exceeds the {} byte cap",
            bytes.len(),
            MAX_FRAME_BYTES
        )));
    }
    let len = (bytes.len() as u32).to_be_bytes();
    conn.write_all(&len)
        .await
        .map_err(|e| AcquireError::Transport(e.to_string()))?;
    conn.write_all(bytes)
        .await
        .map_err(|e| AcquireError::Transport(e.to_string()))?;
    conn.flush()
        .await
        .map_err(|e| AcquireError::Transport(e.to_string()))?;
    Ok(())
}

/// Reads one frame, returning `None` when the peer closed the connection
/// cleanly at a frame boundary.
pub async fn read_frame<R>(conn: &mut R) -> Result<Option<String>, AcquireError>
where
    R: AsyncRead + Unpin + Send,
{
    // The prefix is read byte-wise so a close before any prefix byte is a
    // clean end of the connection, while a close inside the prefix is a
    // torn frame.
    let mut len_buf = [0u8; 4];
    let mut filled = 0usize;
    while filled < len_buf.len() {
        let n = conn
            .read(&mut len_buf[filled..])
            .await
            .map_err(|e| AcquireError::Transport(e.to_string()))?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(AcquireError::Transport(format!(
                "connection closed inside a frame length prefix ({} of 4 bytes)",
                filled
            )));
        }
        filled += n;
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(AcquireError::Transport(format!(
            "peer announced a {} byte frame, cap is {}",
            len, MAX_FRAME_BYTES
        )));
    }

    let mut payload = vec![0u8; len];
    conn.read_exact(&mut payload)
        .await
        .map_err(|e| AcquireError::Transport(e.to_string()))?;
    String::from_utf8(payload)
        .map(Some)
        .map_err(|e| AcquireError::Transport(format!("frame is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frame_round_trip() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        write_frame(&mut client, "lstsens").await.unwrap();

        let frame = read_frame(&mut server).await.unwrap();
        assert_eq!(frame.as_deref(), Some("lstsens"));
    }

    #[tokio::test]
    async fn test_clean_close_reads_as_none() {
        let (client, mut server) = tokio::io::duplex(1024);
        drop(client);

        let frame = read_frame(&mut server).await.unwrap();
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn test_torn_length_prefix_is_a_transport_error() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        tokio::io::AsyncWriteExt::write_all(&mut client, &[0x00, 0x00])
            .await
            .unwrap();
        drop(client);

        let result = read_frame(&mut server).await;
        assert!(matches!(result, Err(AcquireError::Transport(_))));
    }

    #[tokio::test]
    async fn test_oversized_length_prefix_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let len = ((MAX_FRAME_BYTES + 1) as u32).to_be_bytes();
        tokio::io::AsyncWriteExt::write_all(&mut client, &len)
            .await
            .unwrap();

        let result = read_frame(&mut server).await;
        assert!(matches!(result, Err(AcquireError::Transport(_))));
    }

    #[tokio::test]
    async fn test_oversized_outgoing_frame_is_rejected() {
        let (mut client, _server) = tokio::io::duplex(1024);
        let payload = "x".repeat(MAX_FRAME_BYTES + 1);

        let result = write_frame(&mut client, &payload).await;
        assert!(matches!(result, Err(AcquireError::Transport(_))));
    }

    #[test]
    fn test_command_tokens() {
        for command in [
            Command::ListSensors,
            Command::Calibrate,
            Command::Plot,
            Command::Capture,
        ] {
            assert_eq!(Command::parse(command.token()), Some(command));
        }
        assert_eq!(Command::parse("shutdown"), None);
    }
}
