//! Per-connection command dispatch.
//!
//! A connection carries a sequence of requests: a command token frame,
//! optionally followed by a JSON payload frame, answered by one or more
//! response frames. Malformed requests are answered with an error frame and
//! the connection stays open; transport failures end the connection.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use capture_rs::ports::ChannelOpener;
use capture_rs::preview::PreviewSink;
use capture_rs::services::AcquisitionService;
use common::constants::MAX_CAPTURE_DURATION_SECS;
use common::{AcquireError, CaptureRequest, PlotRequest, SensorSelection};

use crate::protocol::{read_frame, write_frame, Command, STATUS_PLOT_COMPLETE};
use crate::registry::SensorRegistry;

pub struct Dispatcher<O>
where
    O: ChannelOpener,
{
    service: AcquisitionService<O>,
    registry: Box<dyn SensorRegistry>,
}

impl<O> Dispatcher<O>
where
    O: ChannelOpener,
{
    pub fn new(service: AcquisitionService<O>, registry: Box<dyn SensorRegistry>) -> Self {
        Self { service, registry }
    }

    /// Serves one client until it closes the connection or the transport
    /// fails.
    pub async fn handle_connection<S>(&self, conn: &mut S) -> Result<(), AcquireError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        loop {
            let token = match read_frame(conn).await? {
                Some(token) => token,
                None => return Ok(()),
            };
            log::info!("Received command: {}", token);

            match Command::parse(&token) {
                Some(Command::ListSensors) => self.list_sensors(conn).await?,
                Some(Command::Calibrate) => self.calibrate(conn).await?,
                Some(Command::Plot) => self.plot(conn).await?,
                Some(Command::Capture) => self.capture(conn).await?,
                None => {
                    log::warn!("Unknown command: {}", token);
                    write_frame(conn, &format!("error: unknown command {}", token)).await?;
                }
            }
        }
    }

    async fn list_sensors<S>(&self, conn: &mut S) -> Result<(), AcquireError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        match self.registry.connected_sensors().await {
            Ok(sensors) => {
                log::info!("Sensors found: {}", sensors.len());
                let payload = serde_json::to_string(&sensors)
                    .map_err(|e| AcquireError::Transport(e.to_string()))?;
                write_frame(conn, &payload).await
            }
            Err(e) => write_frame(conn, &format!("error: {}", e)).await,
        }
    }

    async fn calibrate<S>(&self, conn: &mut S) -> Result<(), AcquireError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let selection: Vec<SensorSelection> = match self.read_request(conn).await? {
            Some(selection) => selection,
            None => return Ok(()),
        };

        match self.service.calibrate(&selection).await {
            Ok(results) => {
                let payload = serde_json::to_string(&results)
                    .map_err(|e| AcquireError::Transport(e.to_string()))?;
                write_frame(conn, &payload).await
            }
            Err(e) => {
                log::error!("Calibration failed: {}", e);
                write_frame(conn, &format!("error: {}", e)).await
            }
        }
    }

    async fn plot<S>(&self, conn: &mut S) -> Result<(), AcquireError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let requests: Vec<PlotRequest> = match self.read_request(conn).await? {
            Some(requests) => requests,
            None => return Ok(()),
        };
        let request = match requests.into_iter().next() {
            Some(request) => request,
            None => {
                return write_frame(conn, "error: no channel selected for preview").await;
            }
        };

        let result = {
            let mut sink = ConnectionSink { conn: &mut *conn };
            self.service.preview(&mut sink, &request).await
        };
        match result {
            Ok(batches) => {
                log::info!("Samples sent: {} batches", batches);
                write_frame(conn, STATUS_PLOT_COMPLETE).await
            }
            // A gone consumer means the connection itself is dead.
            Err(e @ AcquireError::Transport(_)) => Err(e),
            Err(e) => {
                log::error!("Preview failed on {}: {}", request.path, e);
                write_frame(conn, &format!("error: {}", e)).await
            }
        }
    }

    async fn capture<S>(&self, conn: &mut S) -> Result<(), AcquireError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let requests: Vec<CaptureRequest> = match self.read_request(conn).await? {
            Some(requests) => requests,
            None => return Ok(()),
        };
        if let Some(bad) = requests
            .iter()
            .find(|r| r.duration == 0 || r.duration > MAX_CAPTURE_DURATION_SECS)
        {
            log::warn!(
                "Rejected capture request: duration {}s on {}",
                bad.duration,
                bad.path
            );
            return write_frame(
                conn,
                &format!(
                    "error: duration {}s out of range (1..={}s)",
                    bad.duration, MAX_CAPTURE_DURATION_SECS
                ),
            )
            .await;
        }

        let report = self.service.capture(requests, None).await;
        for outcome in report.outcomes.iter().filter(|o| !o.is_completed()) {
            log::error!("Channel {} ({}) failed", outcome.path, outcome.name);
        }
        log::info!(
            "Capture session {}: {} completed, {} failed",
            report.session,
            report.completed(),
            report.failed()
        );
        write_frame(conn, report.status_line()).await
    }

    /// Reads and parses the JSON payload frame of the current request.
    ///
    /// A parse failure is answered with an error frame and reported as
    /// `None`, leaving the connection open; a close mid-request is a
    /// transport error.
    async fn read_request<S, T>(&self, conn: &mut S) -> Result<Option<T>, AcquireError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
        T: serde::de::DeserializeOwned,
    {
        let payload = read_frame(conn).await?.ok_or_else(|| {
            AcquireError::Transport("connection closed mid-request".to_string())
        })?;
        match serde_json::from_str(&payload) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Rejected request payload: {}", e);
                write_frame(conn, &format!("error: bad request: {}", e)).await?;
                Ok(None)
            }
        }
    }
}

/// Forwards preview batches to the client as JSON frames.
struct ConnectionSink<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    conn: &'a mut S,
}

#[async_trait]
impl<S> PreviewSink for ConnectionSink<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn push(&mut self, batch: Vec<String>) -> Result<(), AcquireError> {
        let payload =
            serde_json::to_string(&batch).map_err(|e| AcquireError::Transport(e.to_string()))?;
        write_frame(self.conn, &payload).await
    }
}
