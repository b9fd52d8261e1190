use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server returned {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Backend rejected the request: {detail}")]
    Rejected { detail: String },
}

impl ClientError {
    pub fn server(status: u16, detail: impl Into<String>) -> Self {
        ClientError::Server {
            status,
            detail: detail.into(),
        }
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        ClientError::Rejected {
            detail: detail.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Server { status: 404, .. })
    }

    /// Short operator-facing reason, without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            ClientError::Transport { source, .. } => source.to_string(),
            ClientError::Server { detail, .. } => detail.clone(),
            ClientError::Decode { message, .. } => message.clone(),
            ClientError::Rejected { detail } => detail.clone(),
        }
    }
}
