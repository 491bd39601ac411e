//! Shared functionality for the sensor capture workspace

pub mod constants;
pub mod errors;

#[doc(hidden)]
pub mod types;

// Re-export types
#[doc(inline)]
pub use errors::AcquireError;
#[doc(inline)]
pub use types::{
    CalibrationResult, CaptureReport, CaptureRequest, ChannelOutcome, ChannelStatus, DecodedRecord,
    DecodedValue, PlotRequest, SensorInfo, SensorSelection,
};
