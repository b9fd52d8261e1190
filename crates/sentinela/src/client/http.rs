//! `reqwest` implementation of the collaborator traits.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::client::api::{IngestApi, LogSource, RegistryApi, StagingApi};
use crate::client::wire::{
    self, DocumentsResponse, LogsResponse, ScanListResponse, StagingListResponse, StatusResponse,
    TextResponse,
};
use crate::client::ClientError;
use crate::config::ApiConfig;
use crate::model::{
    ApprovalRequest, Document, ProcessReceipt, ProcessRequest, QueuedDocument, RegistryStats,
    ScanFile, StagingDocument, UploadForm, UploadReceipt,
};

/// Client for the console's admin API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Builds a client from the `api` config section.
    ///
    /// `base_url` should point at the API root, e.g. `http://localhost:8000/api`.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(concat!("sentinela/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport {
                endpoint: "client builder".to_string(),
                source: e,
            })?;

        let backend = Self::with_client(client, &config.base_url);
        info!(base_url = %crate::sanitize::redact_url(&backend.base_url), "backend client ready");
        Ok(backend)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<String, ClientError> {
        debug!(endpoint, "sending request");
        let resp = request.send().await.map_err(|e| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source: e.without_url(),
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source: e.without_url(),
        })?;

        if !status.is_success() {
            let detail = wire::error_detail(&body);
            warn!(endpoint, status = status.as_u16(), detail = %detail, "backend returned an error");
            return Err(ClientError::server(status.as_u16(), detail));
        }

        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let body = self.send(endpoint, request).await?;
        decode(endpoint, &body)
    }

    async fn acknowledge(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<StatusResponse, ClientError> {
        let body = self.send(endpoint, request).await?;
        // Some endpoints answer with an empty 2xx body.
        if body.trim().is_empty() {
            return Ok(StatusResponse::default());
        }
        decode::<StatusResponse>(endpoint, &body)?.into_result()
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl RegistryApi for HttpBackend {
    async fn list_documents(&self, limit: usize) -> Result<Vec<Document>, ClientError> {
        let request = self
            .client
            .get(self.url("documents/"))
            .query(&[("limit", limit)]);
        let docs = self
            .fetch::<DocumentsResponse>("documents", request)
            .await?
            .into_documents();
        debug!(count = docs.len(), "listed documents");
        Ok(docs)
    }

    async fn get_stats(&self) -> Result<RegistryStats, ClientError> {
        let request = self.client.get(self.url("admin/stats"));
        self.fetch("stats", request).await
    }

    async fn delete_document(&self, id: &str) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&format!("documents/{}", id)));
        self.acknowledge("documents/{id}", request).await?;
        info!(id, "document deleted");
        Ok(())
    }
}

#[async_trait]
impl StagingApi for HttpBackend {
    async fn list_staging(&self) -> Result<Vec<StagingDocument>, ClientError> {
        let request = self.client.get(self.url("admin/staging"));
        let resp: StagingListResponse<StagingDocument> = self.fetch("staging", request).await?;
        Ok(resp.documents)
    }

    async fn list_queued(&self) -> Result<Vec<QueuedDocument>, ClientError> {
        let request = self.client.get(self.url("admin/staging/queued"));
        let resp: StagingListResponse<QueuedDocument> =
            self.fetch("staging/queued", request).await?;
        Ok(resp.documents)
    }

    async fn staging_text(&self, id: &str) -> Result<String, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("admin/staging/{}/text", id)));
        let resp: TextResponse = self.fetch("staging/{id}/text", request).await?;
        Ok(resp.text)
    }

    async fn approve(&self, id: &str, approval: &ApprovalRequest) -> Result<(), ClientError> {
        let request = self
            .client
            .post(self.url(&format!("admin/staging/{}/approve", id)))
            .json(approval);
        self.acknowledge("staging/{id}/approve", request).await?;
        info!(id, doc_type = %approval.doc_type, "staging document approved");
        Ok(())
    }

    async fn activate(&self, id: &str) -> Result<(), ClientError> {
        let request = self
            .client
            .post(self.url(&format!("admin/staging/{}/activate", id)));
        self.acknowledge("staging/{id}/activate", request).await?;
        Ok(())
    }
}

#[async_trait]
impl IngestApi for HttpBackend {
    async fn list_scan_files(&self) -> Result<Vec<ScanFile>, ClientError> {
        let request = self.client.get(self.url("admin/ingest/list"));
        let resp: ScanListResponse = self.fetch("ingest/list", request).await?;
        if wire::is_error_status(resp.status.as_deref()) {
            return Err(ClientError::rejected(
                resp.detail.unwrap_or_else(|| "scan listing failed".to_string()),
            ));
        }
        Ok(resp.files)
    }

    async fn process_scan(&self, process: &ProcessRequest) -> Result<ProcessReceipt, ClientError> {
        let request = self
            .client
            .post(self.url("admin/ingest/process"))
            .json(process);
        let resp = self.acknowledge("ingest/process", request).await?;
        info!(items = process.items.len(), "scan processing requested");
        Ok(ProcessReceipt {
            status: resp.status,
            detail: resp.detail.or(resp.message),
        })
    }

    async fn upload(&self, form: UploadForm) -> Result<UploadReceipt, ClientError> {
        let file_name = form.file_name.clone();
        let part = Part::bytes(form.bytes)
            .file_name(form.file_name)
            .mime_str(&form.mime_type)
            .map_err(|e| ClientError::Transport {
                endpoint: "upload".to_string(),
                source: e,
            })?;

        let mut multipart = Form::new()
            .part("file", part)
            .text("tags", form.tags)
            .text("source", form.source)
            .text("doc_type", form.doc_type.to_string());
        if let Some(custom) = form.custom_filename {
            multipart = multipart.text("custom_filename", custom);
        }

        let request = self.client.post(self.url("upload/")).multipart(multipart);
        let resp = self.acknowledge("upload", request).await?;
        info!(file = %file_name, doc_id = ?resp.doc_id, "file uploaded");
        Ok(UploadReceipt {
            status: resp.status,
            doc_id: resp.doc_id,
        })
    }
}

#[async_trait]
impl LogSource for HttpBackend {
    async fn tail_logs(&self, lines: usize) -> Result<Vec<String>, ClientError> {
        let request = self
            .client
            .get(self.url("admin/logs"))
            .query(&[("lines", lines)]);
        let resp: LogsResponse = self.fetch("logs", request).await?;
        Ok(resp.logs)
    }
}
