use std::path::PathBuf;

use uuid::Uuid;

/// Terminal state of one capture worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelStatus {
    /// The channel read its full byte budget and produced a file.
    Completed {
        file: PathBuf,
        rejected_samples: u64,
    },
    /// The channel failed or was aborted; no file was produced.
    Failed(String),
}

/// Outcome of one channel within a capture session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOutcome {
    pub path: String,
    pub name: String,
    pub status: ChannelStatus,
}

impl ChannelOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, ChannelStatus::Completed { .. })
    }
}

/// Per-channel results of a capture session.
///
/// The wire contract stays the single status string the client expects;
/// the structured outcomes exist for logs and in-process callers, which is
/// where partial failures are detected.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub session: Uuid,
    pub outcomes: Vec<ChannelOutcome>,
}

impl CaptureReport {
    pub fn new(session: Uuid, outcomes: Vec<ChannelOutcome>) -> Self {
        Self { session, outcomes }
    }

    /// The aggregate status string sent back to the client.
    pub fn status_line(&self) -> &'static str {
        "Measurement complete."
    }

    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }
}
