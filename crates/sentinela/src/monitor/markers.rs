//! Milestone markers emitted by the backend ingestion pipeline.
//!
//! The backend only reports progress as free-text log lines, so each
//! milestone is recognized by a fixed substring.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_BATCH_PROGRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Indexing progress: Batch (\d+)/(\d+)").unwrap());

/// Pipeline milestone, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    FileSaved,
    ExtractionStarted,
    TextExtracted,
    MetadataRegistration,
    RecordPersisted,
    ChunkingStarted,
    IndexingStarted,
    BatchProgress,
    IndexingCompleted,
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Milestone::FileSaved => "file saved",
            Milestone::ExtractionStarted => "extraction started",
            Milestone::TextExtracted => "text extracted",
            Milestone::MetadataRegistration => "registering metadata",
            Milestone::RecordPersisted => "record saved",
            Milestone::ChunkingStarted => "chunking",
            Milestone::IndexingStarted => "indexing",
            Milestone::BatchProgress => "indexing batches",
            Milestone::IndexingCompleted => "indexing complete",
        };
        f.write_str(label)
    }
}

/// A phase marker with a fixed percentage.
#[derive(Debug, Clone, Copy)]
pub struct PhaseMarker {
    pub milestone: Milestone,
    pub patterns: &'static [&'static str],
    pub percent: u8,
}

impl PhaseMarker {
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| text.contains(p))
    }
}

/// Fixed-percentage phases, in table order.
pub const PHASE_MARKERS: &[PhaseMarker] = &[
    PhaseMarker {
        milestone: Milestone::FileSaved,
        patterns: &["💾 Salvando arquivo", "💾 Recebendo upload"],
        percent: 10,
    },
    PhaseMarker {
        milestone: Milestone::ExtractionStarted,
        patterns: &["🔍 Iniciando extração"],
        percent: 20,
    },
    PhaseMarker {
        milestone: Milestone::TextExtracted,
        patterns: &["✅ Texto extraído"],
        percent: 40,
    },
    PhaseMarker {
        milestone: Milestone::MetadataRegistration,
        patterns: &["🗄️ Registrando metadados"],
        percent: 60,
    },
    PhaseMarker {
        milestone: Milestone::RecordPersisted,
        patterns: &["📝 Registro salvo"],
        percent: 70,
    },
    PhaseMarker {
        milestone: Milestone::ChunkingStarted,
        patterns: &["🧠 Gerando fragmentos"],
        percent: 75,
    },
    PhaseMarker {
        milestone: Milestone::IndexingStarted,
        patterns: &["Start Indexing"],
        percent: 80,
    },
];

pub const TERMINAL_PATTERNS: &[&str] = &["🎉 Indexação concluída", "Indexing complete"];

/// Base and span of the batch-progress range: `80 + floor(19 * n / m)`.
pub const BATCH_BASE_PERCENT: u8 = 80;
pub const BATCH_SPAN_PERCENT: u8 = 19;

/// Markers that concern every job sharing the log. Kept in the display
/// subset regardless of the job token.
pub const GLOBAL_DISPLAY_MARKERS: &[&str] = &[
    "Indexing progress:",
    "Start Indexing",
    "🎉 Indexação concluída",
    "Indexing complete",
];

pub fn is_terminal(text: &str) -> bool {
    TERMINAL_PATTERNS.iter().any(|p| text.contains(p))
}

pub fn is_global_marker(line: &str) -> bool {
    GLOBAL_DISPLAY_MARKERS.iter().any(|p| line.contains(p))
}

/// Last `Batch N/M` occurrence in `text`. `M = 0` occurrences are ignored and
/// `N` is clamped to `M`.
pub fn last_batch_progress(text: &str) -> Option<(u64, u64)> {
    RE_BATCH_PROGRESS
        .captures_iter(text)
        .filter_map(|caps| {
            let done: u64 = caps.get(1)?.as_str().parse().ok()?;
            let total: u64 = caps.get(2)?.as_str().parse().ok()?;
            (total > 0).then_some((done.min(total), total))
        })
        .last()
}

pub fn batch_percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return BATCH_BASE_PERCENT;
    }
    let done = u128::from(done.min(total));
    let step = (u128::from(BATCH_SPAN_PERCENT) * done) / u128::from(total);
    BATCH_BASE_PERCENT + step as u8
}
