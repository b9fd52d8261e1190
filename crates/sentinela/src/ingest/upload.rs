//! Manual file upload.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::client::IngestApi;
use crate::error::{IngestError, Result};
use crate::model::{DocType, DocumentSource, UploadForm, UploadReceipt};

/// Wire tag the upload endpoint expects for operator uploads.
pub const MANUAL_UPLOAD_TAG: &str = "user_upload";

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub source: DocumentSource,
    pub doc_type: DocType,
    pub tags: String,
    pub custom_filename: Option<String>,
}

impl UploadRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: DocumentSource::ManualUpload,
            doc_type: DocType::Documento,
            tags: String::new(),
            custom_filename: None,
        }
    }

    pub fn with_source(mut self, source: DocumentSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_doc_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = doc_type;
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_custom_filename(mut self, name: impl Into<String>) -> Self {
        self.custom_filename = Some(name.into());
        self
    }

    pub fn original_filename(&self) -> std::result::Result<String, IngestError> {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| IngestError::InvalidFilename(self.path.clone()))
    }

    /// Rename to request, if any. Blank names and names equal to the original
    /// are dropped.
    pub fn effective_custom_filename(&self, original: &str) -> Option<String> {
        self.custom_filename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != original)
            .map(str::to_string)
    }

    /// Reads the file and builds the multipart payload.
    pub async fn into_form(self) -> Result<UploadForm> {
        let file_name = self.original_filename()?;
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| IngestError::ReadUpload {
                path: self.path.clone(),
                source,
            })?;
        let custom_filename = self.effective_custom_filename(&file_name);
        debug!(file = %file_name, size = bytes.len(), "upload payload read");

        Ok(UploadForm {
            mime_type: guess_mime(&self.path),
            source: source_tag(self.source).to_string(),
            file_name,
            bytes,
            doc_type: self.doc_type,
            tags: self.tags.trim().to_string(),
            custom_filename,
        })
    }

    pub async fn send<A: IngestApi + ?Sized>(self, api: &A) -> Result<UploadReceipt> {
        let form = self.into_form().await?;
        info!(file = %form.file_name, doc_type = %form.doc_type, "uploading");
        Ok(api.upload(form).await?)
    }
}

/// MIME type from the extension, `application/octet-stream` when unknown.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

pub fn source_tag(source: DocumentSource) -> &'static str {
    match source {
        DocumentSource::ManualUpload => MANUAL_UPLOAD_TAG,
        other => other.as_str(),
    }
}
