//! Live preview streaming.
//!
//! Reads a channel in fixed blocks and forwards a stride-downsampled batch
//! of hex samples per block, bounding network volume while preserving
//! enough statistical signal for a live trend plot.

use std::time::Duration;

use async_trait::async_trait;

use common::constants::{
    PREVIEW_ALIGN_SCAN_BYTES, PREVIEW_BLOCK_BYTES, PREVIEW_STRIDE_BYTES, SAMPLE_SIZE,
};
use common::AcquireError;

use crate::ports::ByteStream;

/// Consumer of preview batches, typically the remote plotting client.
#[async_trait]
pub trait PreviewSink: Send {
    /// Pushes one batch of downsampled hex samples. A push failure means
    /// the consumer is gone and abandons the session.
    async fn push(&mut self, batch: Vec<String>) -> Result<(), AcquireError>;
}

/// Streams downsampled samples from `stream` to `sink` for the given
/// wall-clock duration, returning the number of batches pushed.
///
/// Each iteration reads one fixed block, aligns on the start byte within
/// the block's first few bytes (falling back to offset 0 when the marker is
/// not seen there), and emits one 2-byte sample per stride. Both the read
/// and the push are raced against the remaining budget, so neither a quiet
/// channel nor a stalled consumer can hold the session past its deadline.
pub async fn stream_preview(
    stream: &mut dyn ByteStream,
    sink: &mut dyn PreviewSink,
    start_byte: u8,
    duration: Duration,
) -> Result<u64, AcquireError> {
    let deadline = tokio::time::Instant::now() + duration;
    let mut block = vec![0u8; PREVIEW_BLOCK_BYTES];
    let mut batches = 0u64;

    loop {
        if tokio::time::Instant::now() >= deadline {
            break;
        }
        match tokio::time::timeout_at(deadline, stream.read_exact(&mut block)).await {
            // Budget elapsed mid-read; the partial block is discarded.
            Err(_) => break,
            Ok(Err(e)) => return Err(e),
            Ok(Ok(())) => {}
        }

        // The push is bounded too: a slow consumer ends the session at the
        // deadline instead of stretching it.
        match tokio::time::timeout_at(
            deadline,
            sink.push(downsample_block(&block, start_byte)),
        )
        .await
        {
            Err(_) => break,
            Ok(Err(e)) => return Err(e),
            Ok(Ok(())) => batches += 1,
        }
    }

    log::info!("{}: samples sent in {} batches", stream.path(), batches);
    Ok(batches)
}

/// Selects one 2-byte hex sample every stride interval from a raw block.
///
/// Alignment scans only the block's leading bytes for the exact start byte,
/// unlike calibration's full-window scan; a marker that does not show up
/// there leaves the block aligned at 0.
pub fn downsample_block(block: &[u8], start_byte: u8) -> Vec<String> {
    let scan = PREVIEW_ALIGN_SCAN_BYTES.min(block.len());
    let aligned = block[..scan]
        .iter()
        .position(|&b| b == start_byte)
        .unwrap_or(0);

    let mut batch = Vec::with_capacity(block.len() / PREVIEW_STRIDE_BYTES + 1);
    let mut i = aligned;
    while i + SAMPLE_SIZE <= block.len() {
        batch.push(format!("{:02x}{:02x}", block[i], block[i + 1]));
        i += PREVIEW_STRIDE_BYTES;
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_block(lead: u8, payload: u8) -> Vec<u8> {
        let mut block = Vec::with_capacity(PREVIEW_BLOCK_BYTES);
        for _ in 0..PREVIEW_BLOCK_BYTES / 2 {
            block.push(lead);
            block.push(payload);
        }
        block
    }

    #[test]
    fn test_full_block_yields_five_samples() {
        let block = constant_block(0x7e, 0x64);
        let batch = downsample_block(&block, 0x7e);
        assert_eq!(batch.len(), 5);
        assert!(batch.iter().all(|s| s == "7e64"));
    }

    #[test]
    fn test_alignment_follows_marker_within_scan() {
        // Three leading noise bytes, then the marker: samples are taken at
        // 3, 203, 403, 603, 803.
        let mut block = vec![0x01, 0x02, 0x03];
        block.extend(constant_block(0x7e, 0x64));
        block.truncate(PREVIEW_BLOCK_BYTES);
        let batch = downsample_block(&block, 0x7e);
        assert_eq!(batch.len(), 5);
        assert!(batch.iter().all(|s| s == "7e64"));
    }

    #[test]
    fn test_missing_marker_defaults_to_block_start() {
        let block = vec![0x11u8; PREVIEW_BLOCK_BYTES];
        let batch = downsample_block(&block, 0x7e);
        assert_eq!(batch.len(), 5);
        assert!(batch.iter().all(|s| s == "1111"));
    }
}
