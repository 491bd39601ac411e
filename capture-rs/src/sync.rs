//! Start-byte detection.
//!
//! The boards emit an unframed stream in which the frame marker recurs once
//! per 2-byte sample, so over a short window the marker is the most frequent
//! byte value by a wide margin. Majority vote is enough to synchronize
//! without a documented protocol.

use std::time::Duration;

use tokio::time::Instant;

use common::AcquireError;

use crate::ports::ByteStream;

/// Observes `stream` for the given wall-clock window and returns the most
/// frequent byte value as the frame marker.
///
/// Ties are broken in favor of the value observed first. A window that
/// yields no bytes at all leaves the channel unusable and returns a
/// `SynchronizationFailure`.
pub async fn detect_start_byte(
    stream: &mut dyn ByteStream,
    window: Duration,
) -> Result<u8, AcquireError> {
    let deadline = Instant::now() + window;
    let mut counts = [0u64; 256];
    let mut first_seen = [usize::MAX; 256];
    let mut observed = 0usize;
    let mut byte = [0u8; 1];

    loop {
        match tokio::time::timeout_at(deadline, stream.read(&mut byte)).await {
            // Window elapsed mid-read.
            Err(_) => break,
            // Source ended; the window is over early.
            Ok(Ok(0)) => break,
            Ok(Ok(_)) => {
                let value = byte[0] as usize;
                if counts[value] == 0 {
                    first_seen[value] = observed;
                }
                counts[value] += 1;
                observed += 1;
            }
            Ok(Err(e)) => return Err(e),
        }
        if Instant::now() >= deadline {
            break;
        }
    }

    let mut best: Option<usize> = None;
    for value in 0..counts.len() {
        if counts[value] == 0 {
            continue;
        }
        best = match best {
            None => Some(value),
            Some(current) => {
                if counts[value] > counts[current]
                    || (counts[value] == counts[current]
                        && first_seen[value] < first_seen[current])
                {
                    Some(value)
                } else {
                    Some(current)
                }
            }
        };
    }

    best.map(|value| value as u8).ok_or_else(|| {
        AcquireError::SynchronizationFailure(format!(
            "{}: no bytes observed during the detection window",
            stream.path()
        ))
    })
}

