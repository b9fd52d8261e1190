//! Sources of job progress readings.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{ClientError, LogSource};
use crate::monitor::mapper::{map_progress, ProgressEstimate};

/// One poll result: the raw lines seen plus what they imply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReading {
    pub lines: Vec<String>,
    pub estimate: ProgressEstimate,
}

/// Something the job monitor can poll for progress.
#[async_trait]
pub trait ProgressFeed: Send + Sync {
    async fn poll(&self, job_token: Option<&str>) -> Result<FeedReading, ClientError>;
}

/// Infers progress by scraping the tail of the shared backend log.
///
/// The log is global, so concurrent jobs bleed into each other's estimates and
/// the percentage can move backwards between polls.
pub struct LogTailFeed {
    source: Arc<dyn LogSource>,
    lines: usize,
}

impl LogTailFeed {
    pub fn new(source: Arc<dyn LogSource>, lines: usize) -> Self {
        Self { source, lines }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }
}

#[async_trait]
impl ProgressFeed for LogTailFeed {
    async fn poll(&self, job_token: Option<&str>) -> Result<FeedReading, ClientError> {
        let lines = self.source.tail_logs(self.lines).await?;
        let estimate = map_progress(&lines, job_token);
        Ok(FeedReading { lines, estimate })
    }
}
