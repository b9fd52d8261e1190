//! Read-side view of the document registry, plus deletion.

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::{ClientError, RegistryApi, StagingApi};
use crate::model::{Document, QueuedDocument, RegistryStats, StagingDocument};

pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Failed(ClientError),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}

/// Per-id results of a bulk delete, in request order.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub outcomes: Vec<(String, DeleteOutcome)>,
}

impl DeleteReport {
    pub fn deleted_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_deleted()).count()
    }

    pub fn not_found(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, DeleteOutcome::NotFound))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// `"<id>: <detail>"` for each failed deletion.
    pub fn failures(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|(id, o)| match o {
                DeleteOutcome::Failed(e) => Some(format!("{}: {}", id, e.detail())),
                _ => None,
            })
            .collect()
    }
}

pub struct DocumentRegistry<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for DocumentRegistry<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B> DocumentRegistry<B>
where
    B: RegistryApi + StagingApi + ?Sized,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub async fn list_documents(&self, limit: usize) -> Result<Vec<Document>, ClientError> {
        self.backend.list_documents(limit).await
    }

    pub async fn get_stats(&self) -> Result<RegistryStats, ClientError> {
        self.backend.get_stats().await
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), ClientError> {
        self.backend.delete_document(id).await
    }

    /// Deletes one id at a time. A failure does not stop the rest.
    pub async fn delete_documents<S: AsRef<str>>(&self, ids: &[S]) -> DeleteReport {
        let mut report = DeleteReport::default();
        for id in ids.iter().map(AsRef::as_ref) {
            let outcome = match self.backend.delete_document(id).await {
                Ok(()) => DeleteOutcome::Deleted,
                Err(e) if e.is_not_found() => {
                    warn!(id, "document not found");
                    DeleteOutcome::NotFound
                }
                Err(e) => {
                    warn!(id, error = %e, "delete failed");
                    DeleteOutcome::Failed(e)
                }
            };
            report.outcomes.push((id.to_string(), outcome));
        }
        info!(
            requested = ids.len(),
            deleted = report.deleted_count(),
            "bulk delete finished"
        );
        report
    }

    pub async fn list_staging(&self) -> Result<Vec<StagingDocument>, ClientError> {
        self.backend.list_staging().await
    }

    pub async fn list_queued(&self) -> Result<Vec<QueuedDocument>, ClientError> {
        self.backend.list_queued().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ApprovalRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct DeleteOnly {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RegistryApi for DeleteOnly {
        async fn list_documents(&self, _limit: usize) -> Result<Vec<Document>, ClientError> {
            Ok(vec![])
        }

        async fn get_stats(&self) -> Result<RegistryStats, ClientError> {
            Err(ClientError::server(500, "unused"))
        }

        async fn delete_document(&self, id: &str) -> Result<(), ClientError> {
            self.calls.lock().unwrap().push(id.to_string());
            match id {
                "gone" => Err(ClientError::server(404, "Document not found")),
                "locked" => Err(ClientError::server(500, "database is locked")),
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl StagingApi for DeleteOnly {
        async fn list_staging(&self) -> Result<Vec<StagingDocument>, ClientError> {
            Ok(vec![])
        }

        async fn list_queued(&self) -> Result<Vec<QueuedDocument>, ClientError> {
            Ok(vec![])
        }

        async fn staging_text(&self, _id: &str) -> Result<String, ClientError> {
            Ok(String::new())
        }

        async fn approve(&self, _id: &str, _request: &ApprovalRequest) -> Result<(), ClientError> {
            Ok(())
        }

        async fn activate(&self, _id: &str) -> Result<(), ClientError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_bulk_delete_continues_past_failures() {
        let backend = Arc::new(DeleteOnly::default());
        let registry = DocumentRegistry::new(backend.clone());

        let report = registry
            .delete_documents(&["a", "gone", "locked", "b"])
            .await;

        assert_eq!(*backend.calls.lock().unwrap(), vec!["a", "gone", "locked", "b"]);
        assert_eq!(report.deleted_count(), 2);
        assert_eq!(report.not_found(), vec!["gone"]);
        assert_eq!(report.failures(), vec!["locked: database is locked"]);
    }

    #[tokio::test]
    async fn test_single_delete_not_found() {
        let registry = DocumentRegistry::new(Arc::new(DeleteOnly::default()));
        let err = registry.delete_document("gone").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
