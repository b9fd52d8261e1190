//! Recurring log poll for one backend job.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, info, warn, Instrument};

use crate::broadcast::{JobProgressBroadcaster, JobSnapshot, MonitorReporter};
use crate::config::MonitorConfig;
use crate::monitor::feed::ProgressFeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub grace_delay: Duration,
    pub initial_percent: u8,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            grace_delay: config.grace_delay(),
            initial_percent: config.initial_percent.min(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Polling,
    /// Terminal marker seen; waiting out the grace delay.
    Completed,
    Resolved,
    Stopped,
}

/// Latest state of a monitor, readable without subscribing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorStatus {
    pub phase: MonitorPhase,
    pub percent: u8,
    pub ticks: u64,
    pub failed_polls: u64,
}

/// Starts monitors that poll a [`ProgressFeed`].
#[derive(Clone)]
pub struct JobMonitor {
    feed: Arc<dyn ProgressFeed>,
    settings: MonitorSettings,
    broadcaster: JobProgressBroadcaster,
}

impl JobMonitor {
    pub fn new(feed: Arc<dyn ProgressFeed>, settings: MonitorSettings) -> Self {
        Self {
            feed,
            settings,
            broadcaster: JobProgressBroadcaster::default(),
        }
    }

    pub fn with_broadcaster(mut self, broadcaster: JobProgressBroadcaster) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn broadcaster(&self) -> &JobProgressBroadcaster {
        &self.broadcaster
    }

    pub fn settings(&self) -> MonitorSettings {
        self.settings
    }

    /// Spawns the poll loop. The first poll happens one interval after start.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, job_token: Option<String>) -> MonitorHandle {
        let id = uuid::Uuid::new_v4().to_string();
        let cancel = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(MonitorStatus {
            phase: MonitorPhase::Polling,
            percent: self.settings.initial_percent,
            ticks: 0,
            failed_polls: 0,
        });

        let span = debug_span!("monitor", monitor_id = %id, job_token = ?job_token);
        let task = tokio::spawn(
            poll_loop(PollLoop {
                feed: Arc::clone(&self.feed),
                settings: self.settings,
                reporter: self.broadcaster.reporter(&id),
                job_token,
                cancel: cancel.clone(),
                status: status_tx,
            })
            .instrument(span),
        );
        info!(monitor_id = %id, "job monitor started");

        MonitorHandle {
            id,
            cancel,
            status: status_rx,
            task: Some(task),
        }
    }
}

struct PollLoop {
    feed: Arc<dyn ProgressFeed>,
    settings: MonitorSettings,
    reporter: MonitorReporter,
    job_token: Option<String>,
    cancel: CancellationToken,
    status: watch::Sender<MonitorStatus>,
}

impl PollLoop {
    fn finish(&self, phase: MonitorPhase) {
        // Event first: a status watcher may drop the handle as soon as the phase flips.
        match phase {
            MonitorPhase::Resolved => self.reporter.resolved(),
            MonitorPhase::Stopped => self.reporter.stopped(),
            MonitorPhase::Polling | MonitorPhase::Completed => {}
        }
        self.status.send_modify(|s| s.phase = phase);
        debug!(phase = ?phase, "job monitor finished");
    }
}

async fn poll_loop(ctx: PollLoop) {
    let mut ticker = tokio::time::interval(ctx.settings.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // skip immediate first tick

    let mut percent = ctx.settings.initial_percent;

    loop {
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return ctx.finish(MonitorPhase::Stopped),
            _ = ticker.tick() => {}
        }

        let reading = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return ctx.finish(MonitorPhase::Stopped),
            reading = ctx.feed.poll(ctx.job_token.as_deref()) => reading,
        };

        let reading = match reading {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "log poll failed, retrying next tick");
                ctx.status.send_modify(|s| s.failed_polls += 1);
                continue;
            }
        };

        if let Some(estimate) = reading.estimate.percent {
            percent = estimate;
        }
        let terminal = reading.estimate.terminal;
        debug!(percent, terminal, milestone = ?reading.estimate.milestone, "monitor tick");

        ctx.status.send_modify(|s| {
            s.percent = percent;
            s.ticks += 1;
            if terminal {
                s.phase = MonitorPhase::Completed;
            }
        });
        ctx.reporter.snapshot(JobSnapshot {
            monitor_id: ctx.reporter.monitor_id().to_string(),
            job_token: ctx.job_token.clone(),
            lines: reading.lines,
            display_lines: reading.estimate.display_lines,
            percent,
            estimated: reading.estimate.percent.is_some(),
            terminal,
            timestamp: Utc::now(),
        });

        if terminal {
            break;
        }
    }

    info!("job reached its terminal marker");
    tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => ctx.finish(MonitorPhase::Stopped),
        _ = tokio::time::sleep(ctx.settings.grace_delay) => ctx.finish(MonitorPhase::Resolved),
    }
}

/// Owns a running monitor. Dropping the handle aborts the task.
pub struct MonitorHandle {
    id: String,
    cancel: CancellationToken,
    status: watch::Receiver<MonitorStatus>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn watch(&self) -> watch::Receiver<MonitorStatus> {
        self.status.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops polling. Publishes `Stopped` unless the monitor already resolved.
    pub fn stop(mut self) {
        self.cancel.cancel();
        // Detach so the task can publish its final event.
        self.task.take();
    }

    /// Dismisses the monitor before the grace delay runs out.
    pub fn dismiss(self) {
        self.stop();
    }

    /// Stops polling and waits for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Waits until the monitor resolves or is stopped elsewhere.
    pub async fn wait(mut self) -> MonitorStatus {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.status()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.cancel.cancel();
            task.abort();
        }
    }
}

/// Holds at most one active monitor for a job surface.
#[derive(Default)]
pub struct MonitorSlot {
    current: Option<MonitorHandle>,
}

impl MonitorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a monitor, stopping the one already in the slot.
    pub fn start(&mut self, monitor: &JobMonitor, job_token: Option<String>) -> &MonitorHandle {
        self.stop();
        self.current.insert(monitor.start(job_token))
    }

    pub fn stop(&mut self) {
        if let Some(previous) = self.current.take() {
            debug!(monitor_id = %previous.id(), "stopping previous monitor");
            previous.stop();
        }
    }

    pub fn current(&self) -> Option<&MonitorHandle> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn take(&mut self) -> Option<MonitorHandle> {
        self.current.take()
    }
}
