//! Local-scan listing and processing payloads.

use serde::{Deserialize, Serialize};

use super::document::{DocType, Sphere};

/// A file waiting in the backend's ingest folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFile {
    pub filename: String,
    #[serde(default, alias = "size")]
    pub size_bytes: u64,
    #[serde(default, alias = "modified")]
    pub modified_at: Option<String>,
}

/// One entry of `POST ingest/process`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestItem {
    pub filename: String,
    pub doc_type: DocType,
    pub sphere: Sphere,
    pub tags: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub items: Vec<IngestItem>,
}

/// Summary returned by `POST ingest/process`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessReceipt {
    pub status: Option<String>,
    pub detail: Option<String>,
}

/// A fully prepared multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// Wire tag for the `source` form field.
    pub source: String,
    pub doc_type: DocType,
    pub tags: String,
    pub custom_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadReceipt {
    pub status: Option<String>,
    pub doc_id: Option<String>,
}
