//! Offset calibration.
//!
//! The zero-offset of a channel is the median of a freshly sampled window of
//! decoded values. Re-running yields a statistically similar but not
//! identical offset, since the window is captured anew on every call.

use std::time::Duration;

use common::constants::{BAUD_RATE, CALIBRATION_WINDOW_BYTES, SAMPLE_SIZE, SENSITIVITY,
    SYNC_WINDOW_MILLIS};
use common::{AcquireError, CalibrationResult, SensorSelection};

use crate::decode;
use crate::ports::{ByteStream, ChannelOpener};
use crate::sync;

/// Calibrates one open channel: detects the frame marker, captures a
/// 2_000-byte window, and returns `(offset, start_byte)`.
///
/// The forward scan for the marker is bounded by the window itself; a
/// window in which the marker never occurs fails with
/// `SynchronizationFailure` instead of hanging.
pub async fn calibrate_channel(
    stream: &mut dyn ByteStream,
) -> Result<(f64, u8), AcquireError> {
    let start_byte =
        sync::detect_start_byte(stream, Duration::from_millis(SYNC_WINDOW_MILLIS)).await?;

    let mut window = vec![0u8; CALIBRATION_WINDOW_BYTES];
    stream.read_exact(&mut window).await?;

    let aligned = window.iter().position(|&b| b == start_byte).ok_or_else(|| {
        AcquireError::SynchronizationFailure(format!(
            "{}: start byte 0x{:02x} absent from the {}-byte calibration window",
            stream.path(),
            start_byte,
            CALIBRATION_WINDOW_BYTES
        ))
    })?;

    let mut values: Vec<f64> = window[aligned..]
        .chunks_exact(SAMPLE_SIZE)
        .map(|pair| decode::decode_sample([pair[0], pair[1]], SENSITIVITY, 0.0).value)
        .collect();

    if values.is_empty() {
        return Err(AcquireError::Calibration(format!(
            "{}: calibration window decoded to no samples",
            stream.path()
        )));
    }

    Ok((median(&mut values), start_byte))
}

/// Calibrates the selected channels sequentially, opening and closing each
/// channel around its own calibration.
///
/// Any channel failure fails the whole operation; calibration results are
/// only meaningful as a complete set for the client's later capture request.
pub async fn calibrate(
    opener: &dyn ChannelOpener,
    selection: &[SensorSelection],
) -> Result<Vec<CalibrationResult>, AcquireError> {
    log::info!("Calibration in progress over {} channels", selection.len());
    let mut results = Vec::with_capacity(selection.len());

    for sensor in selection {
        let mut stream = opener.open(&sensor.path, BAUD_RATE).await?;
        let (offset, start_byte) = calibrate_channel(stream.as_mut()).await?;
        log::info!(
            "Calibrated {} ({}): offset {:.2}, start byte 0x{:02x}",
            sensor.name,
            sensor.path,
            offset,
            start_byte
        );
        results.push(CalibrationResult::new(
            &sensor.path,
            &sensor.name,
            offset,
            start_byte,
        ));
    }

    Ok(results)
}

/// Statistical median; the mean of the two middle elements for even counts.
fn median(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
