//! Preview sinks for tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use capture_rs::preview::PreviewSink;
use common::AcquireError;

/// Collects every pushed batch for later inspection.
#[derive(Clone, Default)]
pub struct CollectorSink {
    batches: Arc<Mutex<Vec<Vec<String>>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl PreviewSink for CollectorSink {
    async fn push(&mut self, batch: Vec<String>) -> Result<(), AcquireError> {
        self.batches.lock().await.push(batch);
        Ok(())
    }
}

/// A consumer that has gone away; every push fails.
pub struct ClosedSink;

#[async_trait]
impl PreviewSink for ClosedSink {
    async fn push(&mut self, _batch: Vec<String>) -> Result<(), AcquireError> {
        Err(AcquireError::Transport(
            "preview consumer disconnected".to_string(),
        ))
    }
}
