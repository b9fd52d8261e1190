//! Job progress inferred from the backend log.

pub mod feed;
pub mod job_monitor;
pub mod mapper;
pub mod markers;

pub use feed::{FeedReading, LogTailFeed, ProgressFeed};
pub use job_monitor::{
    JobMonitor, MonitorHandle, MonitorPhase, MonitorSettings, MonitorSlot, MonitorStatus,
};
pub use mapper::{display_subset, map_progress, ProgressEstimate};
pub use markers::Milestone;
