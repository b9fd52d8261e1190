//! Batch run broadcaster.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::batch::BatchRun;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEventKind {
    Started,
    ItemStarted {
        index: usize,
        label: String,
    },
    ItemSucceeded {
        index: usize,
        label: String,
    },
    ItemFailed {
        index: usize,
        label: String,
        error: String,
    },
    Finished {
        skipped: usize,
        cancelled: bool,
    },
}

/// A change to a batch run, with the run state after the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgressEvent {
    pub run_id: String,
    #[serde(flatten)]
    pub kind: BatchEventKind,
    pub run: BatchRun,
    pub timestamp: DateTime<Utc>,
}

/// Broadcasts batch progress events for streaming.
#[derive(Clone)]
pub struct BatchProgressBroadcaster {
    sender: Arc<broadcast::Sender<BatchProgressEvent>>,
}

impl BatchProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: BatchProgressEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BatchProgressEvent> {
        self.sender.subscribe()
    }

    /// Starts tracking a new run and announces it.
    pub fn start_run(&self, total: usize) -> BatchTracker {
        let tracker = BatchTracker::new(
            &uuid::Uuid::new_v4().to_string(),
            total,
            Arc::clone(&self.sender),
        );
        tracker.publish(BatchEventKind::Started);
        tracker
    }
}

impl Default for BatchProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Owns the [`BatchRun`] state of one run and publishes every change.
pub struct BatchTracker {
    run_id: String,
    run: BatchRun,
    sender: Arc<broadcast::Sender<BatchProgressEvent>>,
}

impl BatchTracker {
    pub fn new(run_id: &str, total: usize, sender: Arc<broadcast::Sender<BatchProgressEvent>>) -> Self {
        Self {
            run_id: run_id.to_string(),
            run: BatchRun {
                total,
                ..BatchRun::default()
            },
            sender,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run(&self) -> &BatchRun {
        &self.run
    }

    pub fn item_started(&mut self, index: usize, label: &str) {
        self.run.current_label = Some(label.to_string());
        self.publish(BatchEventKind::ItemStarted {
            index,
            label: label.to_string(),
        });
    }

    pub fn item_succeeded(&mut self, index: usize, label: &str) {
        self.run.processed += 1;
        self.publish(BatchEventKind::ItemSucceeded {
            index,
            label: label.to_string(),
        });
    }

    pub fn item_failed(&mut self, index: usize, label: &str, error: &str) {
        self.run.errors += 1;
        self.publish(BatchEventKind::ItemFailed {
            index,
            label: label.to_string(),
            error: error.to_string(),
        });
    }

    pub fn finished(&mut self, skipped: usize, cancelled: bool) {
        self.run.current_label = None;
        self.publish(BatchEventKind::Finished { skipped, cancelled });
    }

    fn publish(&self, kind: BatchEventKind) {
        let _ = self.sender.send(BatchProgressEvent {
            run_id: self.run_id.clone(),
            kind,
            run: self.run.clone(),
            timestamp: Utc::now(),
        });
    }
}
