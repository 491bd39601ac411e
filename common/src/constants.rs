//! Fixed acquisition parameters of the sensor boards.
//!
//! None of these are user-tunable at runtime: the boards stream at a fixed
//! baud rate and sampling rate, and the calibration and preview windows are
//! matched to those rates.

/// Baud rate of every sensor channel.
pub const BAUD_RATE: u32 = 375_000;

/// Sampling rate of the sensor in samples per second.
pub const SAMPLING_RATE: usize = 15_000;

/// Size of one raw sample in bytes.
pub const SAMPLE_SIZE: usize = 2;

/// Scale factor converting a raw integer reading to physical units (units/LSB).
pub const SENSITIVITY: f64 = 0.08;

/// Wall-clock window for start-byte detection, in milliseconds.
pub const SYNC_WINDOW_MILLIS: u64 = 125;

/// Upper bound on a requested capture duration, in seconds. An hour at the
/// fixed sampling rate is already a 108 MB buffer per channel; anything
/// beyond that is a malformed request, not a measurement.
pub const MAX_CAPTURE_DURATION_SECS: u64 = 3_600;

/// Raw bytes captured for offset calibration (1_000 samples).
pub const CALIBRATION_WINDOW_BYTES: usize = 2_000;

/// Wall-clock duration of a live preview session, in seconds.
pub const PREVIEW_DURATION_SECS: u64 = 30;

/// Raw bytes read per preview iteration.
pub const PREVIEW_BLOCK_BYTES: usize = 1_000;

/// Byte interval at which the preview selects a sample for transmission.
pub const PREVIEW_STRIDE_BYTES: usize = 200;

/// Leading bytes of a preview block scanned for the start byte.
pub const PREVIEW_ALIGN_SCAN_BYTES: usize = 10;
