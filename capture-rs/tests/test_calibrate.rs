use std::time::Duration;

use capture_rs::calibrate::calibrate_channel;
use common::constants::{CALIBRATION_WINDOW_BYTES, SENSITIVITY};
use common::AcquireError;
use test_utils::channels::{framed_stream, ScriptedChannel};

const SYNC_BYTES: usize = 64;

#[tokio::test]
async fn test_calibrate_channel_constant_stream() {
    // A short detection section, then a constant calibration window: the
    // offset must equal the constant sample's decoded value. The pause ends
    // the detection window after exactly SYNC_BYTES bytes.
    let mut script = framed_stream(0x7e, &[0x10, 0x20, 0x30, 0x40], SYNC_BYTES / 2);
    script.extend(framed_stream(0x7e, &[0x64], CALIBRATION_WINDOW_BYTES / 2));
    let mut stream = ScriptedChannel::new("/dev/ttyUSB0", script)
        .with_pause(SYNC_BYTES, Duration::from_millis(200));

    let (offset, start_byte) = calibrate_channel(&mut stream).await.unwrap();
    assert_eq!(start_byte, 0x7e);
    let expected = u16::from_be_bytes([0x7e, 0x64]) as f64 * SENSITIVITY;
    assert!((offset - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_calibrate_channel_missing_marker_is_bounded() {
    // The detection section sees only 0xaa, but the calibration window
    // holds a different constant: the marker scan must fail, not hang.
    let mut script = vec![0xaa; SYNC_BYTES];
    script.extend(std::iter::repeat(0xbb).take(CALIBRATION_WINDOW_BYTES));
    let mut stream = ScriptedChannel::new("/dev/ttyUSB0", script)
        .with_pause(SYNC_BYTES, Duration::from_millis(200));

    let result = calibrate_channel(&mut stream).await;
    assert!(matches!(
        result,
        Err(AcquireError::SynchronizationFailure(_))
    ));
}

#[tokio::test]
async fn test_short_window_is_a_channel_failure() {
    // Stream ends before the 2_000-byte window is satisfied.
    let mut script = vec![0xaa; SYNC_BYTES];
    script.extend(framed_stream(0xaa, &[0x64], 50));
    let mut stream = ScriptedChannel::new("/dev/ttyUSB0", script)
        .with_pause(SYNC_BYTES, Duration::from_millis(200));

    let result = calibrate_channel(&mut stream).await;
    assert!(matches!(result, Err(AcquireError::ChannelUnavailable(_))));
}
