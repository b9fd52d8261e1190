//! Response envelopes, one per endpoint shape.

use serde::Deserialize;

use crate::client::ClientError;
use crate::model::{Document, ScanFile};

/// `GET documents/` returns a bare array; some deployments wrap it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DocumentsResponse {
    List(Vec<Document>),
    Wrapped { data: Vec<Document> },
}

impl DocumentsResponse {
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            DocumentsResponse::List(docs) => docs,
            DocumentsResponse::Wrapped { data } => data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StagingListResponse<T> {
    #[serde(default = "Vec::new")]
    pub documents: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct TextResponse {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScanListResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub files: Vec<ScanFile>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Generic `{status, detail?, message?}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl StatusResponse {
    /// A 2xx body can still say `{"status": "error"}`.
    pub fn into_result(self) -> Result<Self, ClientError> {
        if is_error_status(self.status.as_deref()) {
            let detail = self
                .detail
                .clone()
                .or_else(|| self.message.clone())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(ClientError::rejected(detail));
        }
        Ok(self)
    }
}

pub fn is_error_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("error"))
}

/// Error body of a non-2xx response. `detail` is a string for handled errors
/// and a list of validation problems for malformed requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extracts the operator-facing detail from an error body, falling back to
/// the truncated raw body.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody {
            detail: serde_json::Value::Array(items),
        }) => items
            .iter()
            .map(|item| {
                item.get("msg")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string())
            })
            .collect::<Vec<_>>()
            .join("; "),
        Ok(ErrorBody { detail }) if !detail.is_null() => detail.to_string(),
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => crate::sanitize::truncate_body(body),
    }
}
