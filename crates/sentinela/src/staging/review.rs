use tracing::{info, warn};

use crate::client::StagingApi;
use crate::error::Result;
use crate::model::{QueuedDocument, StagingDocument};
use crate::staging::classifier::StagingClassifier;

/// Notice shown in place of the preview when the text cannot be loaded.
pub const PREVIEW_UNAVAILABLE: &str = "Erro ao carregar texto.";

/// Extracted text shown next to the metadata form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPreview {
    Loaded(String),
    Unavailable { notice: String, reason: String },
}

impl TextPreview {
    pub fn text(&self) -> &str {
        match self {
            TextPreview::Loaded(text) => text,
            TextPreview::Unavailable { notice, .. } => notice,
        }
    }
}

/// One review session: a classifier plus the backend calls around it.
pub struct StagingReview<'a, A: StagingApi + ?Sized> {
    api: &'a A,
    classifier: StagingClassifier,
    preview: TextPreview,
}

impl<'a, A: StagingApi + ?Sized> StagingReview<'a, A> {
    /// Loads the text preview and starts classification. A failed preview
    /// does not prevent the review.
    pub async fn open(api: &'a A, doc: &StagingDocument) -> StagingReview<'a, A> {
        let preview = match api.staging_text(&doc.id).await {
            Ok(text) => TextPreview::Loaded(text),
            Err(e) => {
                warn!(id = %doc.id, error = %e, "could not load staging text preview");
                TextPreview::Unavailable {
                    notice: PREVIEW_UNAVAILABLE.to_string(),
                    reason: e.detail(),
                }
            }
        };

        StagingReview {
            api,
            classifier: StagingClassifier::new(doc),
            preview,
        }
    }

    pub fn preview(&self) -> &TextPreview {
        &self.preview
    }

    pub fn classifier(&self) -> &StagingClassifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut StagingClassifier {
        &mut self.classifier
    }

    /// Validates, then approves on the backend. If the approval call fails
    /// the classifier returns to metadata entry so the caller can retry.
    pub async fn submit(&mut self) -> Result<QueuedDocument> {
        let queued = self.classifier.validate()?;

        if let Err(e) = self.api.approve(&queued.id, &queued.approval_request()).await {
            self.classifier.revise()?;
            return Err(e.into());
        }

        self.classifier.mark_submitted()?;
        info!(
            id = %queued.id,
            filename = %queued.filename,
            branch = %queued.branch(),
            "staging document queued"
        );
        Ok(queued)
    }

    pub fn into_classifier(self) -> StagingClassifier {
        self.classifier
    }
}
