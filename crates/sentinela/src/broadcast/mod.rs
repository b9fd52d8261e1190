//! Broadcast channels for live progress streaming.
//!
//! Subscribers (the CLI renderer, tests) receive every event published after
//! they subscribe; publishing with no subscriber is not an error.

pub mod batch_progress;
pub mod job_progress;

pub use batch_progress::{BatchEventKind, BatchProgressBroadcaster, BatchProgressEvent, BatchTracker};
pub use job_progress::{JobProgressBroadcaster, JobSnapshot, MonitorEvent, MonitorReporter};
