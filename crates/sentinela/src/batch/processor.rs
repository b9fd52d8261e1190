//! Sequential activation of queued documents.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::batch::pacing::Pacer;
use crate::broadcast::BatchProgressBroadcaster;
use crate::client::{Activator, ClientError, StagingApi};
use crate::config::BatchConfig;
use crate::model::QueuedDocument;

/// Live state of one processing pass. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRun {
    pub total: usize,
    pub processed: usize,
    pub errors: usize,
    /// Filename of the item being activated.
    pub current_label: Option<String>,
}

/// One failed activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub id: String,
    pub filename: String,
    pub detail: String,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.filename, self.detail)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub processed_count: usize,
    pub error_count: usize,
    pub errors: Vec<ItemError>,
    /// Items never attempted because the run was cancelled.
    pub skipped_count: usize,
    pub cancelled: bool,
}

impl BatchOutcome {
    /// Errors rendered as `"<filename>: <detail>"`.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && !self.cancelled
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} processed, {} failed", self.processed_count, self.error_count)?;
        if self.cancelled {
            write!(f, ", {} skipped (cancelled)", self.skipped_count)?;
        }
        Ok(())
    }
}

/// Drives queued documents through activation one at a time, in input order.
///
/// A failed item is recorded and the run moves on; nothing is retried.
pub struct BatchProcessor {
    pacer: Pacer,
    broadcaster: BatchProgressBroadcaster,
    cancel: CancellationToken,
}

impl BatchProcessor {
    pub fn new(pacer: Pacer) -> Self {
        Self {
            pacer,
            broadcaster: BatchProgressBroadcaster::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(Pacer::from(config))
    }

    pub fn with_broadcaster(mut self, broadcaster: BatchProgressBroadcaster) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn pacer(&self) -> Pacer {
        self.pacer
    }

    pub fn broadcaster(&self) -> &BatchProgressBroadcaster {
        &self.broadcaster
    }

    /// Token that stops the run before its next item.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run<A>(&self, documents: &[QueuedDocument], activator: &A) -> BatchOutcome
    where
        A: Activator + ?Sized,
    {
        let span = info_span!("batch.run", total = documents.len());
        self.run_inner(documents, activator).instrument(span).await
    }

    /// Lists the queue and activates all of it.
    pub async fn run_queue<A>(&self, api: &A) -> Result<BatchOutcome, ClientError>
    where
        A: StagingApi + ?Sized,
    {
        let queued = api.list_queued().await?;
        Ok(self.run(&queued, api).await)
    }

    async fn run_inner<A>(&self, documents: &[QueuedDocument], activator: &A) -> BatchOutcome
    where
        A: Activator + ?Sized,
    {
        let mut tracker = self.broadcaster.start_run(documents.len());
        let mut outcome = BatchOutcome::default();
        info!(run_id = %tracker.run_id(), "batch started");

        for (index, doc) in documents.iter().enumerate() {
            if index > 0 {
                tokio::select! {
                    _ = self.pacer.pause() => {}
                    _ = self.cancel.cancelled() => {}
                }
            }

            if self.cancel.is_cancelled() {
                outcome.cancelled = true;
                outcome.skipped_count = documents.len() - index;
                warn!(skipped = outcome.skipped_count, "batch cancelled");
                break;
            }

            tracker.item_started(index, &doc.filename);
            match activator.activate_document(doc).await {
                Ok(()) => {
                    outcome.processed_count += 1;
                    tracker.item_succeeded(index, &doc.filename);
                    info!(filename = %doc.filename, "activated");
                }
                Err(e) => {
                    let error = ItemError {
                        id: doc.id.clone(),
                        filename: doc.filename.clone(),
                        detail: e.detail(),
                    };
                    warn!(filename = %doc.filename, error = %e, "activation failed");
                    tracker.item_failed(index, &doc.filename, &error.detail);
                    outcome.error_count += 1;
                    outcome.errors.push(error);
                }
            }
        }

        tracker.finished(outcome.skipped_count, outcome.cancelled);
        info!(
            processed = outcome.processed_count,
            errors = outcome.error_count,
            skipped = outcome.skipped_count,
            "batch finished"
        );
        outcome
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(Pacer::none())
    }
}
