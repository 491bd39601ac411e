//! Duration-bounded multi-channel capture.
//!
//! One worker per channel, each owning its channel handle exclusively for
//! the lifetime of the measurement. Workers do not communicate; the only
//! coordination point is the scheduler's join.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::Notify;
use uuid::Uuid;

use common::constants::{BAUD_RATE, SAMPLE_SIZE, SAMPLING_RATE, SENSITIVITY};
use common::{CaptureReport, CaptureRequest, ChannelOutcome, ChannelStatus};

use crate::decode;
use crate::ports::{ByteStream, ChannelOpener};
use crate::sink::FileSink;

/// Runs one capture session: opens every requested channel, fans out one
/// worker per channel, and joins them all.
///
/// A channel that cannot be opened, or whose worker fails, is recorded as a
/// failed outcome without disturbing its siblings; partial success is a
/// valid session result. `abort_signal` offers a clean shutdown path: an
/// aborted worker produces no file.
pub async fn run_capture(
    opener: &dyn ChannelOpener,
    requests: Vec<CaptureRequest>,
    sink: &FileSink,
    abort_signal: Option<Arc<Notify>>,
) -> CaptureReport {
    let session = Uuid::new_v4();
    let abort_signal = abort_signal.unwrap_or_else(|| Arc::new(Notify::new()));
    log::info!(
        "Capture session {} over {} channels",
        session,
        requests.len()
    );

    let mut handles = Vec::new();
    let mut outcomes = Vec::new();

    for request in requests {
        match opener.open(&request.path, BAUD_RATE).await {
            Ok(stream) => {
                let sink = sink.clone();
                let abort = Arc::clone(&abort_signal);
                let label = (request.path.clone(), request.name.clone());
                let handle =
                    tokio::spawn(async move { run_worker(stream, request, sink, abort).await });
                handles.push((label, handle));
            }
            Err(e) => {
                log::error!("{}: {}", request.path, e);
                outcomes.push(ChannelOutcome {
                    path: request.path,
                    name: request.name,
                    status: ChannelStatus::Failed(e.to_string()),
                });
            }
        }
    }

    for ((path, name), handle) in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                log::error!("{}: capture worker panicked: {}", path, e);
                outcomes.push(ChannelOutcome {
                    path,
                    name,
                    status: ChannelStatus::Failed(format!("worker panicked: {}", e)),
                });
            }
        }
    }

    let report = CaptureReport::new(session, outcomes);
    log::info!(
        "Capture session {} finished: {} completed, {} failed",
        session,
        report.completed(),
        report.failed()
    );
    report
}

/// One channel's measurement: a single blocking read of the full byte
/// budget, then decode and file emission.
async fn run_worker(
    mut stream: Box<dyn ByteStream>,
    request: CaptureRequest,
    sink: FileSink,
    abort_signal: Arc<Notify>,
) -> ChannelOutcome {
    let budget = match request.byte_budget(SAMPLING_RATE, SAMPLE_SIZE) {
        Some(budget) => budget,
        None => {
            log::error!(
                "{}: duration {}s overflows the byte budget",
                request.name,
                request.duration
            );
            return failed(
                request,
                "requested duration overflows the byte budget".to_string(),
            );
        }
    };
    let mut raw = vec![0u8; budget];

    let started = Local::now();
    tokio::select! {
        result = stream.read_exact(&mut raw) => {
            if let Err(e) = result {
                log::error!("{}: {}", request.name, e);
                return failed(request, e.to_string());
            }
        }
        _ = abort_signal.notified() => {
            log::info!("{}: capture aborted", request.name);
            return failed(request, "capture aborted before the byte budget was read".to_string());
        }
    }
    let ended = Local::now();
    log::info!(
        "{}: recorded {} samples",
        request.name,
        budget / SAMPLE_SIZE
    );

    let (records, rejected) =
        decode::scan_records(&raw, request.start_byte, SENSITIVITY, request.offset);
    log::debug!("{}: incorrect sample count {}", request.name, rejected);

    match sink
        .write_capture(&request.name, started, ended, &records, rejected)
        .await
    {
        Ok(file) => ChannelOutcome {
            path: request.path,
            name: request.name,
            status: ChannelStatus::Completed {
                file,
                rejected_samples: rejected,
            },
        },
        Err(e) => {
            log::error!("{}: {}", request.name, e);
            failed(request, e.to_string())
        }
    }
}

fn failed(request: CaptureRequest, reason: String) -> ChannelOutcome {
    ChannelOutcome {
        path: request.path,
        name: request.name,
        status: ChannelStatus::Failed(reason),
    }
}

