//! Classification lifecycle of one quarantined document.
//!
//! ```text
//! UNCLASSIFIED --classify--> CLASSIFIED --> METADATA_ENTRY --validate--> VALIDATED --> SUBMITTED
//!      ^                                        |    ^                      |
//!      +-------------- reclassify --------------+    +------- revise -------+
//! ```
//!
//! `CLASSIFIED` is passed through immediately. A failed validation leaves the
//! document in `METADATA_ENTRY`. `SUBMITTED` is final.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::model::{ClassificationBranch, DocType, QueuedDocument, Sphere, StagingDocument};
use crate::staging::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    Unclassified,
    Classified(ClassificationBranch),
    MetadataEntry(ClassificationBranch),
    Validated(ClassificationBranch),
    Submitted,
}

impl fmt::Display for ClassifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierState::Unclassified => write!(f, "unclassified"),
            ClassifierState::Classified(branch) => write!(f, "classified ({})", branch),
            ClassifierState::MetadataEntry(branch) => write!(f, "metadata entry ({})", branch),
            ClassifierState::Validated(branch) => write!(f, "validated ({})", branch),
            ClassifierState::Submitted => write!(f, "submitted"),
        }
    }
}

/// An operation that is not allowed in the classifier's current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {action} a document that is {state}")]
pub struct TransitionError {
    pub action: &'static str,
    pub state: ClassifierState,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Editable metadata fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Sphere,
    DocType,
    PublicationDate,
    Ementa,
    Description,
    CustomTags,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Sphere,
        Field::DocType,
        Field::PublicationDate,
        Field::Ementa,
        Field::Description,
        Field::CustomTags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Sphere => "sphere",
            Field::DocType => "docType",
            Field::PublicationDate => "publicationDate",
            Field::Ementa => "ementa",
            Field::Description => "description",
            Field::CustomTags => "customTags",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts both the camelCase names and their snake_case wire spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sphere" => Ok(Field::Sphere),
            "docType" | "doc_type" => Ok(Field::DocType),
            "publicationDate" | "publication_date" => Ok(Field::PublicationDate),
            "ementa" => Ok(Field::Ementa),
            "description" => Ok(Field::Description),
            "customTags" | "custom_tags" => Ok(Field::CustomTags),
            other => Err(format!("unknown field '{}'", other)),
        }
    }
}

/// Raw operator input, unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataDraft {
    pub sphere: String,
    pub doc_type: String,
    pub publication_date: String,
    pub ementa: String,
    pub description: String,
    pub custom_tags: String,
}

impl MetadataDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Sphere => &self.sphere,
            Field::DocType => &self.doc_type,
            Field::PublicationDate => &self.publication_date,
            Field::Ementa => &self.ementa,
            Field::Description => &self.description,
            Field::CustomTags => &self.custom_tags,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Sphere => &mut self.sphere,
            Field::DocType => &mut self.doc_type,
            Field::PublicationDate => &mut self.publication_date,
            Field::Ementa => &mut self.ementa,
            Field::Description => &mut self.description,
            Field::CustomTags => &mut self.custom_tags,
        };
        *slot = value;
    }

    fn apply_branch_defaults(&mut self, branch: ClassificationBranch) {
        self.sphere = Sphere::Municipal.as_str().to_string();
        self.doc_type = match branch {
            ClassificationBranch::Legislation => DocType::LeiOrdinaria,
            ClassificationBranch::Generic => DocType::Generico,
        }
        .to_string();
    }
}

/// Branch and type implied by a discovery-time suggestion.
pub fn infer_classification(suggested: &DocType) -> (ClassificationBranch, DocType) {
    if suggested.suggests_legislation() {
        let doc_type = match suggested {
            DocType::Legislacao => DocType::LeiOrdinaria,
            other => other.clone(),
        };
        (ClassificationBranch::Legislation, doc_type)
    } else {
        let doc_type = match suggested {
            DocType::Tabela => DocType::Tabela,
            _ => DocType::Generico,
        };
        (ClassificationBranch::Generic, doc_type)
    }
}

/// State machine guiding one staging document to a queue-ready record.
#[derive(Debug, Clone)]
pub struct StagingClassifier {
    id: String,
    filename: String,
    state: ClassifierState,
    draft: MetadataDraft,
}

impl StagingClassifier {
    /// Starts a review. A usable suggested type skips manual classification.
    pub fn new(doc: &StagingDocument) -> Self {
        let mut classifier = Self::unclassified(&doc.id, &doc.filename);
        classifier.draft.custom_tags = doc.custom_tags.clone().unwrap_or_default();

        if let Some(suggested) = doc.suggested_type() {
            let (branch, doc_type) = infer_classification(suggested);
            classifier.enter_metadata(branch);
            classifier.draft.doc_type = doc_type.to_string();
            debug!(
                id = %classifier.id,
                suggested = %suggested,
                branch = %branch,
                "auto-classified from suggested type"
            );
        }

        classifier
    }

    pub fn unclassified(id: &str, filename: &str) -> Self {
        Self {
            id: id.to_string(),
            filename: filename.to_string(),
            state: ClassifierState::Unclassified,
            draft: MetadataDraft::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn state(&self) -> ClassifierState {
        self.state
    }

    pub fn branch(&self) -> Option<ClassificationBranch> {
        match self.state {
            ClassifierState::Classified(branch)
            | ClassifierState::MetadataEntry(branch)
            | ClassifierState::Validated(branch) => Some(branch),
            ClassifierState::Unclassified | ClassifierState::Submitted => None,
        }
    }

    pub fn draft(&self) -> &MetadataDraft {
        &self.draft
    }

    pub fn is_submitted(&self) -> bool {
        self.state == ClassifierState::Submitted
    }

    pub fn classify(&mut self, branch: ClassificationBranch) -> Result<(), TransitionError> {
        if self.state != ClassifierState::Unclassified {
            return Err(self.reject("classify"));
        }
        self.enter_metadata(branch);
        Ok(())
    }

    /// Returns to classification, keeping what was entered so far.
    pub fn reclassify(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ClassifierState::Classified(_) | ClassifierState::MetadataEntry(_) => {
                self.transition(ClassifierState::Unclassified);
                Ok(())
            }
            _ => Err(self.reject("reclassify")),
        }
    }

    pub fn set_field(
        &mut self,
        field: Field,
        value: impl Into<String>,
    ) -> Result<(), TransitionError> {
        match self.state {
            ClassifierState::MetadataEntry(_) => {
                self.draft.set(field, value.into());
                Ok(())
            }
            _ => Err(self.reject("edit")),
        }
    }

    /// Validates the draft and moves to `VALIDATED`, returning the queue record.
    ///
    /// On failure the document stays in metadata entry.
    pub fn validate(&mut self) -> Result<QueuedDocument, SubmitError> {
        let branch = match self.state {
            ClassifierState::MetadataEntry(branch) => branch,
            _ => return Err(self.reject("validate").into()),
        };

        validation::validate(branch, &self.draft)?;
        let queued = self.build_queued(branch);
        self.transition(ClassifierState::Validated(branch));
        Ok(queued)
    }

    /// Back from `VALIDATED` to metadata entry, e.g. after a failed approval call.
    pub fn revise(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ClassifierState::Validated(branch) => {
                self.transition(ClassifierState::MetadataEntry(branch));
                Ok(())
            }
            _ => Err(self.reject("revise")),
        }
    }

    pub fn mark_submitted(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ClassifierState::Validated(_) => {
                self.transition(ClassifierState::Submitted);
                Ok(())
            }
            _ => Err(self.reject("submit")),
        }
    }

    /// Validates and submits in one step. No I/O happens here.
    pub fn validate_and_submit(&mut self) -> Result<QueuedDocument, SubmitError> {
        let queued = self.validate()?;
        self.mark_submitted()?;
        Ok(queued)
    }

    fn enter_metadata(&mut self, branch: ClassificationBranch) {
        self.draft.apply_branch_defaults(branch);
        self.transition(ClassifierState::Classified(branch));
        self.transition(ClassifierState::MetadataEntry(branch));
    }

    fn transition(&mut self, next: ClassifierState) {
        debug!(id = %self.id, from = %self.state, to = %next, "staging transition");
        self.state = next;
    }

    fn reject(&self, action: &'static str) -> TransitionError {
        TransitionError {
            action,
            state: self.state,
        }
    }

    fn build_queued(&self, branch: ClassificationBranch) -> QueuedDocument {
        let draft = &self.draft;
        // Validation already rejected unparseable spheres.
        let sphere = non_blank(&draft.sphere).and_then(|s| s.parse::<Sphere>().ok());
        let doc_type = non_blank(&draft.doc_type)
            .map(DocType::from)
            .unwrap_or(DocType::Generico);
        let legislation = branch == ClassificationBranch::Legislation;

        QueuedDocument {
            id: self.id.clone(),
            filename: self.filename.clone(),
            doc_type,
            sphere,
            publication_date: non_blank(&draft.publication_date),
            ementa: if legislation {
                non_blank(&draft.ementa)
            } else {
                None
            },
            description: if legislation {
                None
            } else {
                non_blank(&draft.description)
            },
            custom_tags: non_blank(&draft.custom_tags),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
