pub mod calibration;
pub mod record;
pub mod report;
pub mod sensor;

pub use calibration::CalibrationResult;
pub use record::{DecodedRecord, DecodedValue};
pub use report::{CaptureReport, ChannelOutcome, ChannelStatus};
pub use sensor::{CaptureRequest, PlotRequest, SensorInfo, SensorSelection};
