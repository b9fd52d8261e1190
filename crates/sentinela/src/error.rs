use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentinelaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Client(#[from] crate::client::ClientError),

    #[error("Validation error: {0}")]
    Validation(#[from] crate::staging::ValidationError),

    #[error("Staging error: {0}")]
    Transition(#[from] crate::staging::TransitionError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] crate::logging::LoggingError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No files selected for processing")]
    EmptySelection,

    #[error("File '{0}' is not part of the scan listing")]
    UnknownFile(String),

    #[error("Failed to read upload '{path}': {source}")]
    ReadUpload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload path has no file name: {0}")]
    InvalidFilename(PathBuf),
}

impl From<crate::staging::SubmitError> for SentinelaError {
    fn from(err: crate::staging::SubmitError) -> Self {
        match err {
            crate::staging::SubmitError::Validation(e) => SentinelaError::Validation(e),
            crate::staging::SubmitError::Transition(e) => SentinelaError::Transition(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, SentinelaError>;
