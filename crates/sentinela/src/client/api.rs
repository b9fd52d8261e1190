//! Collaborator traits the core talks to. [`HttpBackend`](super::HttpBackend)
//! implements all of them against the admin API.

use async_trait::async_trait;

use crate::client::ClientError;
use crate::model::{
    ApprovalRequest, Document, ProcessReceipt, ProcessRequest, QueuedDocument, RegistryStats,
    ScanFile, StagingDocument, UploadForm, UploadReceipt,
};

#[async_trait]
pub trait RegistryApi: Send + Sync {
    async fn list_documents(&self, limit: usize) -> Result<Vec<Document>, ClientError>;

    async fn get_stats(&self) -> Result<RegistryStats, ClientError>;

    async fn delete_document(&self, id: &str) -> Result<(), ClientError>;
}

#[async_trait]
pub trait StagingApi: Send + Sync {
    async fn list_staging(&self) -> Result<Vec<StagingDocument>, ClientError>;

    async fn list_queued(&self) -> Result<Vec<QueuedDocument>, ClientError>;

    /// Extracted text preview of a staging document.
    async fn staging_text(&self, id: &str) -> Result<String, ClientError>;

    /// Persists validated metadata and moves the document to the queue.
    async fn approve(&self, id: &str, request: &ApprovalRequest) -> Result<(), ClientError>;

    /// Runs the indexing pipeline for a queued document. Idempotent per id.
    async fn activate(&self, id: &str) -> Result<(), ClientError>;
}

#[async_trait]
pub trait IngestApi: Send + Sync {
    async fn list_scan_files(&self) -> Result<Vec<ScanFile>, ClientError>;

    async fn process_scan(&self, request: &ProcessRequest) -> Result<ProcessReceipt, ClientError>;

    async fn upload(&self, form: UploadForm) -> Result<UploadReceipt, ClientError>;
}

/// Tail of the shared backend log.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn tail_logs(&self, lines: usize) -> Result<Vec<String>, ClientError>;
}

/// The call a batch run makes once per queued document.
#[async_trait]
pub trait Activator: Send + Sync {
    async fn activate_document(&self, doc: &QueuedDocument) -> Result<(), ClientError>;
}

#[async_trait]
impl<T> Activator for T
where
    T: StagingApi + ?Sized,
{
    async fn activate_document(&self, doc: &QueuedDocument) -> Result<(), ClientError> {
        self.activate(&doc.id).await
    }
}
