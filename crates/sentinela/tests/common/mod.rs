//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use sentinela::client::{ClientError, IngestApi, LogSource, RegistryApi, StagingApi};
use sentinela::model::{
    ApprovalRequest, DocType, Document, DocumentSource, DocumentStatus, ProcessReceipt,
    ProcessRequest, QueuedDocument, RegistryStats, ScanFile, Sphere, StagingDocument, UploadForm,
    UploadReceipt,
};

#[derive(Default)]
struct State {
    next_id: u64,
    staging: Vec<StagingDocument>,
    texts: HashMap<String, String>,
    queued: Vec<QueuedDocument>,
    documents: Vec<Document>,
    scan_files: Vec<ScanFile>,
    processed: Vec<ProcessRequest>,
    logs: Vec<String>,
    fail_activation: HashSet<String>,
    approve_failures: usize,
    log_failures: usize,
    calls: Vec<String>,
}

/// In-memory backend that moves documents staging → queued → active.
///
/// Activation appends the pipeline's log lines for that file.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queued(docs: Vec<QueuedDocument>) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().queued = docs;
        backend
    }

    pub fn with_scan_files(self, names: &[&str]) -> Self {
        self.state.lock().unwrap().scan_files = names
            .iter()
            .map(|name| ScanFile {
                filename: name.to_string(),
                size_bytes: 2048,
                modified_at: None,
            })
            .collect();
        self
    }

    /// Activation of this filename answers 500.
    pub fn fail_activation_of(&self, filename: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_activation
            .insert(filename.to_string());
    }

    /// The next `n` approval calls answer 503.
    pub fn fail_next_approvals(&self, n: usize) {
        self.state.lock().unwrap().approve_failures = n;
    }

    /// The next `n` log polls answer 502.
    pub fn fail_next_log_polls(&self, n: usize) {
        self.state.lock().unwrap().log_failures = n;
    }

    pub fn push_log(&self, line: &str) {
        self.state.lock().unwrap().logs.push(line.to_string());
    }

    pub fn add_staging(&self, doc: StagingDocument) {
        self.state.lock().unwrap().staging.push(doc);
    }

    pub fn set_text(&self, id: &str, text: &str) {
        self.state
            .lock()
            .unwrap()
            .texts
            .insert(id.to_string(), text.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn staging(&self) -> Vec<StagingDocument> {
        self.state.lock().unwrap().staging.clone()
    }

    pub fn queued(&self) -> Vec<QueuedDocument> {
        self.state.lock().unwrap().queued.clone()
    }

    pub fn processed(&self) -> Vec<ProcessRequest> {
        self.state.lock().unwrap().processed.clone()
    }

    fn record(state: &mut State, call: String) {
        state.calls.push(call);
    }
}

#[async_trait]
impl RegistryApi for FakeBackend {
    async fn list_documents(&self, limit: usize) -> Result<Vec<Document>, ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("list_documents {}", limit));
        Ok(state.documents.iter().take(limit).cloned().collect())
    }

    async fn get_stats(&self) -> Result<RegistryStats, ClientError> {
        let state = self.state.lock().unwrap();
        let mut sources = HashMap::new();
        for doc in &state.documents {
            let source = doc.source.unwrap_or(DocumentSource::Other).to_string();
            *sources.entry(source).or_insert(0) += 1;
        }
        Ok(RegistryStats {
            total_documents: state.documents.len() as u64,
            last_ingestion: state.documents.last().map(|d| d.created_at),
            sources,
            audit_logs: vec![],
        })
    }

    async fn delete_document(&self, id: &str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("delete {}", id));
        let before = state.documents.len();
        state.documents.retain(|d| d.id != id);
        if state.documents.len() == before {
            return Err(ClientError::server(404, "Document not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl StagingApi for FakeBackend {
    async fn list_staging(&self) -> Result<Vec<StagingDocument>, ClientError> {
        Ok(self.state.lock().unwrap().staging.clone())
    }

    async fn list_queued(&self) -> Result<Vec<QueuedDocument>, ClientError> {
        Ok(self.state.lock().unwrap().queued.clone())
    }

    async fn staging_text(&self, id: &str) -> Result<String, ClientError> {
        self.state
            .lock()
            .unwrap()
            .texts
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::server(404, "Text not available"))
    }

    async fn approve(&self, id: &str, request: &ApprovalRequest) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("approve {}", id));
        if state.approve_failures > 0 {
            state.approve_failures -= 1;
            return Err(ClientError::server(503, "Service Unavailable"));
        }

        let position = state
            .staging
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| ClientError::server(404, "Document not found"))?;
        let doc = state.staging.remove(position);
        let tags = Some(request.custom_tags.clone()).filter(|t| !t.is_empty());
        state.queued.push(QueuedDocument {
            id: doc.id,
            filename: doc.filename,
            doc_type: request.doc_type.clone(),
            sphere: request.sphere,
            publication_date: request.publication_date.clone(),
            ementa: request.ementa.clone(),
            description: request.description.clone(),
            custom_tags: tags,
        });
        Ok(())
    }

    async fn activate(&self, id: &str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("activate {}", id));

        let position = state
            .queued
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| ClientError::server(404, "Document not queued"))?;
        let filename = state.queued[position].filename.clone();
        if state.fail_activation.contains(&filename) {
            return Err(ClientError::server(500, "OCR failed"));
        }

        let doc = state.queued.remove(position);
        state.logs.extend([
            format!("INFO 💾 Salvando arquivo: {}", doc.filename),
            format!("INFO 🔍 Iniciando extração: {}", doc.filename),
            "INFO ✅ Texto extraído (3 páginas)".to_string(),
            format!("INFO 🎉 Indexação concluída: {}", doc.filename),
        ]);
        state.documents.push(Document {
            id: doc.id,
            filename: doc.filename,
            source: Some(DocumentSource::ManualUpload),
            doc_type: Some(doc.doc_type),
            sphere: doc.sphere,
            status: DocumentStatus::Active,
            publication_date: doc.publication_date,
            created_at: Utc::now(),
            ocr_method: Some("docling".to_string()),
            ementa: doc.ementa,
            description: doc.description,
            custom_tags: doc.custom_tags,
        });
        Ok(())
    }
}

#[async_trait]
impl IngestApi for FakeBackend {
    async fn list_scan_files(&self) -> Result<Vec<ScanFile>, ClientError> {
        Ok(self.state.lock().unwrap().scan_files.clone())
    }

    async fn process_scan(&self, request: &ProcessRequest) -> Result<ProcessReceipt, ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("process {}", request.items.len()));
        state.processed.push(request.clone());
        Ok(ProcessReceipt {
            status: Some("processing".to_string()),
            detail: Some(format!("{} files queued", request.items.len())),
        })
    }

    async fn upload(&self, form: UploadForm) -> Result<UploadReceipt, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("doc-{}", state.next_id);
        Self::record(&mut state, format!("upload {}", form.file_name));

        let filename = form.custom_filename.unwrap_or(form.file_name);
        // A plain "documento" upload still needs a human to classify it.
        let doc_type = match form.doc_type {
            DocType::Documento => DocType::PendingClassification,
            other => other,
        };
        state.logs.push(format!("INFO 💾 Recebendo upload: {}", filename));
        state.texts.insert(
            id.clone(),
            String::from_utf8_lossy(&form.bytes).into_owned(),
        );
        state.staging.push(StagingDocument {
            id: id.clone(),
            filename,
            source: Some(DocumentSource::ManualUpload),
            doc_type: Some(doc_type),
            sphere: None,
            custom_tags: Some(form.tags).filter(|t| !t.is_empty()),
            status: DocumentStatus::Pending,
            created_at: Some(Utc::now()),
        });

        Ok(UploadReceipt {
            status: Some("success".to_string()),
            doc_id: Some(id),
        })
    }
}

#[async_trait]
impl LogSource for FakeBackend {
    async fn tail_logs(&self, lines: usize) -> Result<Vec<String>, ClientError> {
        let mut state = self.state.lock().unwrap();
        if state.log_failures > 0 {
            state.log_failures -= 1;
            return Err(ClientError::server(502, "Bad Gateway"));
        }
        let skip = state.logs.len().saturating_sub(lines);
        Ok(state.logs[skip..].to_vec())
    }
}

/// A legislation record ready for activation.
pub fn queued(id: &str, filename: &str) -> QueuedDocument {
    QueuedDocument {
        id: id.to_string(),
        filename: filename.to_string(),
        doc_type: DocType::LeiOrdinaria,
        sphere: Some(Sphere::Municipal),
        publication_date: Some("2024-01-10".to_string()),
        ementa: Some("Dispõe sobre o plano diretor.".to_string()),
        description: None,
        custom_tags: None,
    }
}

pub fn staging(id: &str, filename: &str, suggested: Option<DocType>) -> StagingDocument {
    StagingDocument {
        id: id.to_string(),
        filename: filename.to_string(),
        source: Some(DocumentSource::LocalScan),
        doc_type: suggested,
        sphere: None,
        custom_tags: None,
        status: DocumentStatus::Pending,
        created_at: None,
    }
}
