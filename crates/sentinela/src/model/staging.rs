//! Quarantined (staging) and queued document records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::{DocType, DocumentSource, DocumentStatus, Sphere};

/// Which metadata set a staging document must carry before approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationBranch {
    /// Laws, decrees, gazettes: sphere, type, publication date and ementa.
    Legislation,
    /// Reports, notes and everything else: a description.
    Generic,
}

impl fmt::Display for ClassificationBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationBranch::Legislation => write!(f, "legislation"),
            ClassificationBranch::Generic => write!(f, "generic"),
        }
    }
}

/// A document awaiting human classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingDocument {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub source: Option<DocumentSource>,
    /// Type suggested at discovery time, if any.
    #[serde(default)]
    pub doc_type: Option<DocType>,
    #[serde(default)]
    pub sphere: Option<Sphere>,
    #[serde(default)]
    pub custom_tags: Option<String>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default, deserialize_with = "super::timestamp::option::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

impl StagingDocument {
    /// Suggested type usable for automatic classification.
    ///
    /// `pending_classification` is the backend's "nobody knows yet" marker and
    /// does not count as a suggestion.
    pub fn suggested_type(&self) -> Option<&DocType> {
        self.doc_type
            .as_ref()
            .filter(|t| **t != DocType::PendingClassification)
    }

    /// Splits the comma-separated tag string into trimmed, non-empty tags.
    pub fn tags(&self) -> Vec<&str> {
        split_tags(self.custom_tags.as_deref())
    }
}

/// A fully classified document waiting for batch activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedDocument {
    pub id: String,
    pub filename: String,
    pub doc_type: DocType,
    #[serde(default)]
    pub sphere: Option<Sphere>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub ementa: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub custom_tags: Option<String>,
}

impl QueuedDocument {
    /// Branch this record was validated under.
    ///
    /// Records read back from `staging/queued` do not carry the branch
    /// explicitly, so it is derived from the metadata.
    pub fn branch(&self) -> ClassificationBranch {
        if self.ementa.is_some() || (self.description.is_none() && self.doc_type.is_legislative())
        {
            ClassificationBranch::Legislation
        } else {
            ClassificationBranch::Generic
        }
    }

    /// Payload for `POST staging/{id}/approve`.
    pub fn approval_request(&self) -> ApprovalRequest {
        ApprovalRequest {
            sphere: self.sphere,
            doc_type: self.doc_type.clone(),
            publication_date: self.publication_date.clone(),
            ementa: self.ementa.clone(),
            description: self.description.clone(),
            custom_tags: self.custom_tags.clone().unwrap_or_default(),
        }
    }

    pub fn tags(&self) -> Vec<&str> {
        split_tags(self.custom_tags.as_deref())
    }
}

/// Body of the approval call. Absent optional fields are sent as `null`;
/// tags are always sent, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub sphere: Option<Sphere>,
    pub doc_type: DocType,
    pub publication_date: Option<String>,
    pub ementa: Option<String>,
    pub description: Option<String>,
    pub custom_tags: String,
}

fn split_tags(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(doc_type: DocType) -> QueuedDocument {
        QueuedDocument {
            id: "id-1".to_string(),
            filename: "lei.pdf".to_string(),
            doc_type,
            sphere: None,
            publication_date: None,
            ementa: None,
            description: None,
            custom_tags: None,
        }
    }

    #[test]
    fn test_pending_classification_is_not_a_suggestion() {
        let json = r#"{"id": "s1", "filename": "scan.pdf", "doc_type": "pending_classification"}"#;
        let doc: StagingDocument = serde_json::from_str(json).unwrap();
        assert!(doc.suggested_type().is_none());

        let json = r#"{"id": "s2", "filename": "decreto.pdf", "doc_type": "decreto"}"#;
        let doc: StagingDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.suggested_type(), Some(&DocType::Decreto));
    }

    #[test]
    fn test_tags_split_and_trimmed() {
        let json = r#"{"id": "s1", "filename": "a.pdf", "custom_tags": " saude, ,orcamento ,2024"}"#;
        let doc: StagingDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.tags(), vec!["saude", "orcamento", "2024"]);
    }

    #[test]
    fn test_branch_derived_from_metadata() {
        let mut doc = queued(DocType::Generico);
        doc.description = Some("Relatório anual".to_string());
        assert_eq!(doc.branch(), ClassificationBranch::Generic);

        let mut doc = queued(DocType::Decreto);
        doc.ementa = Some("Regulamenta...".to_string());
        assert_eq!(doc.branch(), ClassificationBranch::Legislation);

        // Backend listing without ementa: fall back to the type.
        assert_eq!(queued(DocType::Portaria).branch(), ClassificationBranch::Legislation);
        assert_eq!(queued(DocType::Tabela).branch(), ClassificationBranch::Generic);
    }

    #[test]
    fn test_approval_request_nulls_absent_fields() {
        let mut doc = queued(DocType::Generico);
        doc.description = Some("Notas".to_string());
        let value = serde_json::to_value(doc.approval_request()).unwrap();
        assert_eq!(value["doc_type"], "generico");
        assert!(value["ementa"].is_null());
        assert!(value["publication_date"].is_null());
        assert!(value["sphere"].is_null());
        assert_eq!(value["description"], "Notas");
        assert_eq!(value["custom_tags"], "");
    }
}
