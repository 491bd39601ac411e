use serde::{Deserialize, Serialize};

/// One connected sensor board as reported to the client.
///
/// The `serial` field falls back to `"-"` when the device exposes no serial
/// number (direct connections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
    pub id: String,
    pub path: String,
    pub name: String,
    pub serial: String,
}

/// A sensor picked by the client for calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSelection {
    pub path: String,
    pub name: String,
}

/// One channel of a capture session, carrying the calibration values the
/// client retained from an earlier `calsens` round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub path: String,
    pub name: String,
    pub offset: f64,
    pub start_byte: u8,
    /// Measurement duration in seconds.
    pub duration: u64,
}

impl CaptureRequest {
    /// Returns the exact byte budget of this channel:
    /// `duration x sampling rate x sample size`.
    ///
    /// `duration` comes from the client, so the multiplication is checked;
    /// `None` means the request cannot be represented as a buffer size.
    pub fn byte_budget(&self, sampling_rate: usize, sample_size: usize) -> Option<usize> {
        usize::try_from(self.duration)
            .ok()?
            .checked_mul(sampling_rate)?
            .checked_mul(sample_size)
    }
}

/// The single channel selected for a live preview session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotRequest {
    pub path: String,
    pub start_byte: u8,
}
