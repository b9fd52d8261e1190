//! Maps a log snapshot to a progress estimate.

use serde::{Deserialize, Serialize};

use crate::monitor::markers::{self, Milestone, PHASE_MARKERS};

/// What one snapshot says about the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEstimate {
    /// `None` when no marker is present; the display keeps its prior value.
    pub percent: Option<u8>,
    pub terminal: bool,
    pub milestone: Option<Milestone>,
    /// Lines to show the operator. Never used for the estimate itself.
    pub display_lines: Vec<String>,
}

/// Estimates progress from the full snapshot.
///
/// The terminal marker wins outright, then the last `Batch N/M` report, then
/// the highest fixed phase present. With a job token the display subset keeps
/// only lines mentioning the token plus the global indexing markers.
pub fn map_progress<S: AsRef<str>>(lines: &[S], job_token: Option<&str>) -> ProgressEstimate {
    let text = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");

    let (percent, terminal, milestone) = if markers::is_terminal(&text) {
        (Some(100), true, Some(Milestone::IndexingCompleted))
    } else if let Some((done, total)) = markers::last_batch_progress(&text) {
        (
            Some(markers::batch_percent(done, total)),
            false,
            Some(Milestone::BatchProgress),
        )
    } else {
        match PHASE_MARKERS.iter().rev().find(|m| m.matches(&text)) {
            Some(marker) => (Some(marker.percent), false, Some(marker.milestone)),
            None => (None, false, None),
        }
    };

    ProgressEstimate {
        percent,
        terminal,
        milestone,
        display_lines: display_subset(lines, job_token),
    }
}

pub fn display_subset<S: AsRef<str>>(lines: &[S], job_token: Option<&str>) -> Vec<String> {
    let token = job_token.map(str::trim).filter(|t| !t.is_empty());
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| match token {
            Some(token) => line.contains(token) || markers::is_global_marker(line),
            None => true,
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_no_estimate() {
        let estimate = map_progress(&["INFO: Application startup complete."], None);
        assert_eq!(estimate.percent, None);
        assert!(!estimate.terminal);
        assert!(map_progress::<&str>(&[], None).percent.is_none());
    }

    #[test]
    fn test_file_saved_only() {
        let estimate = map_progress(&["INFO 💾 Salvando arquivo: lei.pdf"], None);
        assert_eq!(estimate.percent, Some(10));
        assert_eq!(estimate.milestone, Some(Milestone::FileSaved));
    }

    #[test]
    fn test_upload_received_counts_as_file_saved() {
        let estimate = map_progress(&["INFO 💾 Recebendo upload: lei.pdf"], None);
        assert_eq!(estimate.percent, Some(10));
    }

    #[test]
    fn test_highest_phase_wins() {
        let lines = [
            "💾 Salvando arquivo: lei.pdf",
            "🔍 Iniciando extração: lei.pdf",
            "✅ Texto extraído (12 páginas)",
            "🗄️ Registrando metadados",
        ];
        assert_eq!(map_progress(&lines, None).percent, Some(60));

        // Order in the log does not matter.
        let reversed: Vec<&str> = lines.iter().rev().copied().collect();
        assert_eq!(map_progress(&reversed, None).percent, Some(60));
    }

    #[test]
    fn test_batch_progress_overrides_phases() {
        let lines = [
            "💾 Salvando arquivo: lei.pdf",
            "Indexing progress: Batch 3/10 (150/500) saved.",
        ];
        let estimate = map_progress(&lines, None);
        assert_eq!(estimate.percent, Some(85));
        assert_eq!(estimate.milestone, Some(Milestone::BatchProgress));
        assert!(!estimate.terminal);
    }

    #[test]
    fn test_terminal_wins() {
        let lines = [
            "Indexing progress: Batch 3/10 (150/500) saved.",
            "🎉 Indexação concluída: lei.pdf",
            "💾 Salvando arquivo: outro.pdf",
        ];
        let estimate = map_progress(&lines, None);
        assert_eq!(estimate.percent, Some(100));
        assert!(estimate.terminal);
    }

    #[test]
    fn test_english_terminal() {
        let estimate = map_progress(&["Indexing complete for doc 8f2a."], None);
        assert_eq!(estimate.percent, Some(100));
        assert!(estimate.terminal);
    }

    #[test]
    fn test_display_subset_with_token() {
        let lines = [
            "💾 Salvando arquivo: lei.pdf",
            "💾 Salvando arquivo: outro.pdf",
            "Indexing progress: Batch 1/2 (50/100) saved.",
            "Start Indexing: 100 chunks to process for doc 8f2a...",
        ];
        let estimate = map_progress(&lines, Some("lei.pdf"));
        assert_eq!(
            estimate.display_lines,
            vec![
                "💾 Salvando arquivo: lei.pdf",
                "Indexing progress: Batch 1/2 (50/100) saved.",
                "Start Indexing: 100 chunks to process for doc 8f2a...",
            ]
        );
        // The estimate still comes from every line.
        assert_eq!(estimate.percent, Some(89));
    }

    #[test]
    fn test_display_subset_without_token() {
        let lines = ["a", "b"];
        assert_eq!(display_subset(&lines, None), vec!["a", "b"]);
        assert_eq!(display_subset(&lines, Some("  ")), vec!["a", "b"]);
    }
}
