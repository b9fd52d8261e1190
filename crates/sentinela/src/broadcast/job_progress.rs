//! Job monitor broadcaster for live progress streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Result of one log poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    /// Monitor that produced this snapshot.
    pub monitor_id: String,
    /// Token used to filter the display lines, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_token: Option<String>,
    /// Full log tail as fetched.
    pub lines: Vec<String>,
    /// Lines relevant to this job. Equal to `lines` without a token.
    pub display_lines: Vec<String>,
    /// Displayed completion percentage, 0 to 100.
    pub percent: u8,
    /// Whether a marker produced a new estimate on this tick.
    pub estimated: bool,
    pub terminal: bool,
    pub timestamp: DateTime<Utc>,
}

/// Monitor lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A non-terminal poll result.
    Tick(JobSnapshot),
    /// The terminal snapshot. Polling has stopped.
    Completed(JobSnapshot),
    /// The grace delay after completion elapsed.
    #[serde(rename_all = "camelCase")]
    Resolved { monitor_id: String },
    /// The monitor was stopped before resolving.
    #[serde(rename_all = "camelCase")]
    Stopped { monitor_id: String },
}

impl MonitorEvent {
    pub fn monitor_id(&self) -> &str {
        match self {
            MonitorEvent::Tick(snapshot) | MonitorEvent::Completed(snapshot) => {
                &snapshot.monitor_id
            }
            MonitorEvent::Resolved { monitor_id } | MonitorEvent::Stopped { monitor_id } => {
                monitor_id
            }
        }
    }

    pub fn snapshot(&self) -> Option<&JobSnapshot> {
        match self {
            MonitorEvent::Tick(snapshot) | MonitorEvent::Completed(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// True for events after which the monitor emits nothing else.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            MonitorEvent::Resolved { .. } | MonitorEvent::Stopped { .. }
        )
    }
}

/// Broadcasts monitor events for streaming.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<MonitorEvent>>,
}

impl JobProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: MonitorEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    /// Creates a reporter bound to one monitor.
    pub fn reporter(&self, monitor_id: &str) -> MonitorReporter {
        MonitorReporter::new(monitor_id, Arc::clone(&self.sender))
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Publishes events for a single monitor.
#[derive(Clone)]
pub struct MonitorReporter {
    monitor_id: String,
    sender: Arc<broadcast::Sender<MonitorEvent>>,
}

impl MonitorReporter {
    pub fn new(monitor_id: &str, sender: Arc<broadcast::Sender<MonitorEvent>>) -> Self {
        Self {
            monitor_id: monitor_id.to_string(),
            sender,
        }
    }

    pub fn monitor_id(&self) -> &str {
        &self.monitor_id
    }

    pub fn snapshot(&self, snapshot: JobSnapshot) {
        let event = if snapshot.terminal {
            MonitorEvent::Completed(snapshot)
        } else {
            MonitorEvent::Tick(snapshot)
        };
        let _ = self.sender.send(event);
    }

    pub fn resolved(&self) {
        let _ = self.sender.send(MonitorEvent::Resolved {
            monitor_id: self.monitor_id.clone(),
        });
    }

    pub fn stopped(&self) {
        let _ = self.sender.send(MonitorEvent::Stopped {
            monitor_id: self.monitor_id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(percent: u8, terminal: bool) -> JobSnapshot {
        JobSnapshot {
            monitor_id: "mon-1".to_string(),
            job_token: None,
            lines: vec![],
            display_lines: vec![],
            percent,
            estimated: true,
            terminal,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_broadcaster_send_receive() {
        let broadcaster = JobProgressBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();

        broadcaster.send(MonitorEvent::Tick(snapshot(40, false)));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.monitor_id(), "mon-1");
        assert_eq!(received.snapshot().map(|s| s.percent), Some(40));
    }

    #[test]
    fn test_send_without_receivers() {
        let broadcaster = JobProgressBroadcaster::new(10);
        broadcaster.send(MonitorEvent::Resolved {
            monitor_id: "nobody-listening".to_string(),
        });
    }

    #[test]
    fn test_reporter_routes_terminal_snapshot() {
        let broadcaster = JobProgressBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();
        let reporter = broadcaster.reporter("mon-1");

        reporter.snapshot(snapshot(85, false));
        reporter.snapshot(snapshot(100, true));
        reporter.resolved();

        assert!(matches!(rx.try_recv().unwrap(), MonitorEvent::Tick(_)));
        assert!(matches!(rx.try_recv().unwrap(), MonitorEvent::Completed(_)));
        let last = rx.try_recv().unwrap();
        assert!(last.is_final());
        assert_eq!(last.monitor_id(), "mon-1");
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(MonitorEvent::Tick(snapshot(10, false))).unwrap();
        assert_eq!(json["type"], "tick");
        assert_eq!(json["monitorId"], "mon-1");
        assert_eq!(json["displayLines"], serde_json::json!([]));

        let json = serde_json::to_value(MonitorEvent::Stopped {
            monitor_id: "mon-2".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "stopped");
        assert_eq!(json["monitorId"], "mon-2");
    }
}
