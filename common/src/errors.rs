//! Module errors

use std::fmt;

/// Represents the different types of errors that can occur while acquiring
/// sensor data.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquireError {
    /// The physical serial path could not be opened. Fatal to the single
    /// operation requesting the channel; siblings are unaffected.
    ChannelUnavailable(String),

    /// No usable start byte could be established for a channel.
    SynchronizationFailure(String),

    /// Offset calibration produced no usable samples.
    Calibration(String),

    /// An I/O error occurred while reading a channel or writing a capture file.
    Io(String),

    /// The connection to the remote consumer was lost.
    Transport(String),
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireError::ChannelUnavailable(msg) => write!(f, "channel unavailable: {}", msg),
            AcquireError::SynchronizationFailure(msg) => {
                write!(f, "synchronization failure: {}", msg)
            }
            AcquireError::Calibration(msg) => write!(f, "calibration error: {}", msg),
            AcquireError::Io(msg) => write!(f, "io error: {}", msg),
            AcquireError::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for AcquireError {}

impl From<std::io::Error> for AcquireError {
    fn from(error: std::io::Error) -> Self {
        AcquireError::Io(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such port");
        let err: AcquireError = io.into();
        assert!(matches!(err, AcquireError::Io(_)));
        assert!(err.to_string().contains("no such port"));
    }
}
