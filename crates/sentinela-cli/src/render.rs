//! Terminal output: tables on stdout, live progress on stderr.

use sentinela::broadcast::{BatchEventKind, BatchProgressEvent, MonitorEvent};
use sentinela::model::{Document, QueuedDocument, RegistryStats, StagingDocument};
use sentinela::monitor::JobMonitor;
use sentinela::registry::DeleteReport;
use sentinela::{BatchOutcome, MonitorSlot, ScanSelection};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

const BAR_WIDTH: usize = 20;

pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

pub fn print_documents(docs: &[Document]) {
    println!(
        "{:<36}  {:<8}  {:<18}  {:<10}  {:<10}  FILENAME",
        "ID", "STATUS", "TYPE", "SPHERE", "PUBLISHED"
    );
    for doc in docs {
        println!(
            "{:<36}  {:<8}  {:<18}  {:<10}  {:<10}  {}",
            doc.id,
            doc.status.to_string(),
            doc.doc_type.as_ref().map_or("-", |t| t.as_str()),
            doc.sphere.map_or("-", |s| s.as_str()),
            or_dash(doc.publication_date.as_deref()),
            doc.filename
        );
    }
    println!("{} documents", docs.len());
}

pub fn print_stats(stats: &RegistryStats) {
    println!("total documents: {}", stats.total_documents);
    match stats.last_ingestion {
        Some(at) => println!("last ingestion:  {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("last ingestion:  -"),
    }
    let mut sources: Vec<(&String, &u64)> = stats.sources.iter().collect();
    sources.sort();
    for (source, count) in sources {
        println!("  {:<20} {}", source, count);
    }
    if !stats.audit_logs.is_empty() {
        println!("recent activity:");
        for entry in &stats.audit_logs {
            let when = entry
                .timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {}  {:<16} {}",
                when,
                entry.action,
                or_dash(entry.details.as_deref())
            );
        }
    }
}

pub fn print_staging(docs: &[StagingDocument]) {
    println!("{:<36}  {:<24}  FILENAME", "ID", "SUGGESTED");
    for doc in docs {
        println!(
            "{:<36}  {:<24}  {}",
            doc.id,
            doc.suggested_type().map_or("(classify)", |t| t.as_str()),
            doc.filename
        );
    }
    println!("{} awaiting review", docs.len());
}

pub fn print_queued(docs: &[QueuedDocument]) {
    println!("{:<36}  {:<12}  {:<18}  FILENAME", "ID", "BRANCH", "TYPE");
    for doc in docs {
        println!(
            "{:<36}  {:<12}  {:<18}  {}",
            doc.id,
            doc.branch().to_string(),
            doc.doc_type.as_str(),
            doc.filename
        );
    }
    println!("{} queued", docs.len());
}

pub fn print_scan(selection: &ScanSelection) {
    for entry in selection.entries() {
        println!(
            "[{}] {:<40} {:>10}  {}",
            if entry.selected { "x" } else { " " },
            entry.file.filename,
            entry.file.size_bytes,
            entry.doc_type
        );
    }
    println!("{} files, {} selected", selection.len(), selection.selected_count());
}

pub fn print_outcome(outcome: &BatchOutcome) {
    println!("{}", outcome);
    for message in outcome.error_messages() {
        println!("  {}", message);
    }
}

pub fn print_delete_report(report: &DeleteReport) {
    println!("{} deleted", report.deleted_count());
    for id in report.not_found() {
        println!("  {}: not found", id);
    }
    for failure in report.failures() {
        println!("  {}", failure);
    }
}

/// Prints batch events and moves the monitor slot to each item as it starts.
pub fn spawn_batch_renderer(
    mut rx: broadcast::Receiver<BatchProgressEvent>,
    monitor: Option<JobMonitor>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut slot = MonitorSlot::new();
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(n)) => {
                    eprintln!("(skipped {} progress events)", n);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let total = event.run.total;
            match event.kind {
                BatchEventKind::Started => eprintln!("activating {} queued documents", total),
                BatchEventKind::ItemStarted { index, label } => {
                    eprintln!("[{}/{}] {}", index + 1, total, label);
                    if let Some(monitor) = &monitor {
                        slot.start(monitor, Some(label));
                    }
                }
                BatchEventKind::ItemSucceeded { label, .. } => eprintln!("      ok   {}", label),
                BatchEventKind::ItemFailed { label, error, .. } => {
                    eprintln!("      FAIL {}: {}", label, error)
                }
                BatchEventKind::Finished { .. } => break,
            }
        }
        slot.stop();
    })
}

/// Prints monitor ticks. With `single` set, returns after the first final event.
pub fn spawn_monitor_renderer(
    mut rx: broadcast::Receiver<MonitorEvent>,
    single: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_percent: Option<u8> = None;
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };
            match &event {
                MonitorEvent::Tick(snapshot) | MonitorEvent::Completed(snapshot) => {
                    if last_percent != Some(snapshot.percent) || snapshot.terminal {
                        let line = snapshot.display_lines.last().map_or("", String::as_str);
                        eprintln!(
                            "      {} {:>3}%  {}",
                            progress_bar(snapshot.percent),
                            snapshot.percent,
                            line.trim()
                        );
                        last_percent = Some(snapshot.percent);
                    }
                }
                MonitorEvent::Resolved { .. } => {
                    eprintln!("      indexing finished");
                    last_percent = None;
                }
                MonitorEvent::Stopped { .. } => last_percent = None,
            }
            if single && event.is_final() {
                break;
            }
        }
    })
}
