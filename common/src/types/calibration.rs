use serde::{Deserialize, Serialize};

/// Result of calibrating one channel: the zero-offset and the detected
/// frame marker.
///
/// Valid only for the channel instance it was computed from; the client is
/// responsible for retaining it and sending it back with a capture request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationResult {
    pub path: String,
    pub name: String,
    pub offset: f64,
    pub start_byte: u8,
}

impl CalibrationResult {
    pub fn new(path: &str, name: &str, offset: f64, start_byte: u8) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            offset,
            start_byte,
        }
    }
}
