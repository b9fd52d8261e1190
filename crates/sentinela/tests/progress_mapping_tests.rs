//! Table-driven tests for log progress mapping.
//!
//! Each case is a log snapshot as the backend writes it and the estimate the
//! console should derive from it.

use sentinela::monitor::{map_progress, Milestone};

struct MappingCase {
    name: &'static str,
    lines: &'static [&'static str],
    expected_percent: Option<u8>,
    expected_terminal: bool,
    expected_milestone: Option<Milestone>,
}

const CASES: &[MappingCase] = &[
    MappingCase {
        name: "empty_log",
        lines: &[],
        expected_percent: None,
        expected_terminal: false,
        expected_milestone: None,
    },
    MappingCase {
        name: "unrelated_lines",
        lines: &["INFO: Uvicorn running on http://0.0.0.0:8000", "GET /api/admin/stats 200"],
        expected_percent: None,
        expected_terminal: false,
        expected_milestone: None,
    },
    MappingCase {
        name: "file_saved",
        lines: &["INFO 💾 Salvando arquivo: lei.pdf"],
        expected_percent: Some(10),
        expected_terminal: false,
        expected_milestone: Some(Milestone::FileSaved),
    },
    MappingCase {
        name: "extraction_started",
        lines: &["💾 Salvando arquivo: lei.pdf", "🔍 Iniciando extração: lei.pdf"],
        expected_percent: Some(20),
        expected_terminal: false,
        expected_milestone: Some(Milestone::ExtractionStarted),
    },
    MappingCase {
        name: "record_persisted",
        lines: &["📝 Registro salvo (id=42)"],
        expected_percent: Some(70),
        expected_terminal: false,
        expected_milestone: Some(Milestone::RecordPersisted),
    },
    MappingCase {
        name: "chunking_started",
        lines: &["🗄️ Registrando metadados", "🧠 Gerando fragmentos"],
        expected_percent: Some(75),
        expected_terminal: false,
        expected_milestone: Some(Milestone::ChunkingStarted),
    },
    MappingCase {
        name: "indexing_started",
        lines: &["Start Indexing: 240 chunks to process for doc 42..."],
        expected_percent: Some(80),
        expected_terminal: false,
        expected_milestone: Some(Milestone::IndexingStarted),
    },
    MappingCase {
        name: "batch_three_of_ten",
        lines: &["💾 Salvando arquivo: lei.pdf", "Indexing progress: Batch 3/10 (150/500) saved."],
        expected_percent: Some(85),
        expected_terminal: false,
        expected_milestone: Some(Milestone::BatchProgress),
    },
    MappingCase {
        name: "last_batch_report_wins",
        lines: &[
            "Indexing progress: Batch 9/10 (450/500) saved.",
            "Indexing progress: Batch 1/4 (50/200) saved.",
        ],
        expected_percent: Some(84),
        expected_terminal: false,
        expected_milestone: Some(Milestone::BatchProgress),
    },
    MappingCase {
        name: "batch_zero_total_falls_back_to_phase",
        lines: &["Start Indexing: 0 chunks", "Indexing progress: Batch 0/0"],
        expected_percent: Some(80),
        expected_terminal: false,
        expected_milestone: Some(Milestone::IndexingStarted),
    },
    MappingCase {
        name: "terminal_pt",
        lines: &["Indexing progress: Batch 10/10 (500/500) saved.", "🎉 Indexação concluída: lei.pdf"],
        expected_percent: Some(100),
        expected_terminal: true,
        expected_milestone: Some(Milestone::IndexingCompleted),
    },
    MappingCase {
        name: "terminal_then_new_job",
        lines: &["Indexing complete for doc 42.", "💾 Salvando arquivo: outro.pdf"],
        expected_percent: Some(100),
        expected_terminal: true,
        expected_milestone: Some(Milestone::IndexingCompleted),
    },
];

#[test]
fn test_mapping_cases() {
    for case in CASES {
        let estimate = map_progress(case.lines, None);
        assert_eq!(
            estimate.percent, case.expected_percent,
            "case '{}': percent",
            case.name
        );
        assert_eq!(
            estimate.terminal, case.expected_terminal,
            "case '{}': terminal",
            case.name
        );
        assert_eq!(
            estimate.milestone, case.expected_milestone,
            "case '{}': milestone",
            case.name
        );
    }
}

#[test]
fn test_token_never_changes_the_estimate() {
    for case in CASES {
        let unscoped = map_progress(case.lines, None);
        let scoped = map_progress(case.lines, Some("lei.pdf"));
        assert_eq!(unscoped.percent, scoped.percent, "case '{}'", case.name);
        assert_eq!(unscoped.terminal, scoped.terminal, "case '{}'", case.name);
    }
}
