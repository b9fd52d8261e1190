//! Job monitor polling the shared backend log through `LogTailFeed`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{queued, FakeBackend};
use sentinela::client::StagingApi;
use sentinela::monitor::MonitorPhase;
use sentinela::{JobMonitor, LogTailFeed, MonitorEvent, MonitorSettings, MonitorSlot};

fn monitor_for(backend: &Arc<FakeBackend>) -> JobMonitor {
    let feed = LogTailFeed::new(backend.clone(), 50);
    JobMonitor::new(Arc::new(feed), MonitorSettings::default())
}

#[tokio::test(start_paused = true)]
async fn test_monitor_follows_activation_to_resolution() {
    let backend = Arc::new(FakeBackend::with_queued(vec![queued("d1", "lei.pdf")]));
    backend.push_log("INFO 💾 Recebendo upload: lei.pdf");
    backend.push_log("INFO 💾 Recebendo upload: outro.pdf");
    backend.fail_next_log_polls(1);

    let monitor = monitor_for(&backend);
    let mut rx = monitor.broadcaster().subscribe();
    let handle = monitor.start(Some("lei.pdf".to_string()));

    let activator = backend.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        activator.activate("d1").await.unwrap();
    });

    let mut events = Vec::new();
    loop {
        let event = rx.recv().await.unwrap();
        let done = event.is_final();
        events.push(event);
        if done {
            break;
        }
    }

    let first = events[0].snapshot().unwrap();
    assert_eq!(first.percent, 10);
    assert_eq!(first.display_lines, vec!["INFO 💾 Recebendo upload: lei.pdf"]);
    assert_eq!(first.lines.len(), 2);

    let completed = events
        .iter()
        .find(|e| matches!(e, MonitorEvent::Completed(_)))
        .and_then(MonitorEvent::snapshot)
        .unwrap();
    assert_eq!(completed.percent, 100);
    assert!(completed.terminal);
    assert!(matches!(events.last().unwrap(), MonitorEvent::Resolved { .. }));

    let status = handle.wait().await;
    assert_eq!(status.phase, MonitorPhase::Resolved);
    assert_eq!(status.failed_polls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_monitor_keeps_initial_percent_without_markers() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_log("INFO: Application startup complete.");

    let monitor = monitor_for(&backend);
    let mut rx = monitor.broadcaster().subscribe();
    let handle = monitor.start(None);

    let event = rx.recv().await.unwrap();
    let snapshot = event.snapshot().unwrap();
    assert_eq!(snapshot.percent, 5);
    assert!(!snapshot.estimated);
    assert!(!snapshot.terminal);
    assert_eq!(handle.status().phase, MonitorPhase::Polling);

    handle.shutdown().await;
    assert!(matches!(rx.recv().await.unwrap(), MonitorEvent::Stopped { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_slot_holds_one_monitor() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_log("INFO 🔍 Iniciando extração: a.pdf");

    let monitor = monitor_for(&backend);
    let mut rx = monitor.broadcaster().subscribe();
    let mut slot = MonitorSlot::new();

    let first = slot.start(&monitor, Some("a.pdf".to_string())).id().to_string();
    tokio::time::sleep(Duration::from_secs(2)).await;
    let second = slot.start(&monitor, Some("b.pdf".to_string())).id().to_string();

    let mut seen = Vec::new();
    while seen.len() < 3 {
        seen.push(rx.recv().await.unwrap());
    }
    assert_eq!(seen[0].monitor_id(), first);
    assert!(matches!(seen[0], MonitorEvent::Tick(_)));
    assert_eq!(seen[1], MonitorEvent::Stopped { monitor_id: first });
    assert_eq!(seen[2].monitor_id(), second);
    // Another job's lines drop out of the display but still drive the estimate.
    let snapshot = seen[2].snapshot().unwrap();
    assert!(snapshot.display_lines.is_empty());
    assert_eq!(snapshot.percent, 20);
}
