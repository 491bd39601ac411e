use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use common::constants::{BAUD_RATE, PREVIEW_DURATION_SECS};
use common::{AcquireError, CalibrationResult, CaptureReport, CaptureRequest, PlotRequest,
    SensorSelection};

use crate::calibrate;
use crate::capture;
use crate::ports::ChannelOpener;
use crate::preview::{self, PreviewSink};
use crate::sink::FileSink;

/// The acquisition operations served to the command dispatcher.
///
/// The service is stateless between calls: every operation opens the
/// channels it needs and closes them on completion or error. Generic over
/// the channel opener so tests can inject scripted transports.
pub struct AcquisitionService<O>
where
    O: ChannelOpener,
{
    opener: O,
    sink: FileSink,
    preview_duration: Duration,
}

impl<O> AcquisitionService<O>
where
    O: ChannelOpener,
{
    /// Creates a service writing capture files under `output_dir`.
    pub fn new(opener: O, output_dir: impl AsRef<Path>) -> Self {
        Self {
            opener,
            sink: FileSink::new(output_dir),
            preview_duration: Duration::from_secs(PREVIEW_DURATION_SECS),
        }
    }

    /// Overrides the preview session duration. Intended for tests; the
    /// production session length is fixed.
    pub fn with_preview_duration(mut self, duration: Duration) -> Self {
        self.preview_duration = duration;
        self
    }

    /// Performs offset correction on the selected sensors.
    pub async fn calibrate(
        &self,
        selection: &[SensorSelection],
    ) -> Result<Vec<CalibrationResult>, AcquireError> {
        calibrate::calibrate(&self.opener, selection).await
    }

    /// Runs one capture session across the requested channels and reports
    /// per-channel outcomes. `abort_signal` is the clean shutdown path for
    /// an embedding orchestrator; `None` runs every channel to its full
    /// duration.
    pub async fn capture(
        &self,
        requests: Vec<CaptureRequest>,
        abort_signal: Option<Arc<Notify>>,
    ) -> CaptureReport {
        capture::run_capture(&self.opener, requests, &self.sink, abort_signal).await
    }

    /// Streams a bounded live preview of one channel into `sink`, returning
    /// the number of batches pushed. The channel is closed on exit
    /// regardless of the loop outcome.
    pub async fn preview(
        &self,
        sink: &mut dyn PreviewSink,
        request: &PlotRequest,
    ) -> Result<u64, AcquireError> {
        let mut stream = self.opener.open(&request.path, BAUD_RATE).await?;
        preview::stream_preview(
            stream.as_mut(),
            sink,
            request.start_byte,
            self.preview_duration,
        )
        .await
    }
}
