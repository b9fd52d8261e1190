//! Typed client for the backend admin API.

pub mod api;
pub mod error;
pub mod http;
pub mod wire;

pub use api::{Activator, IngestApi, LogSource, RegistryApi, StagingApi};
pub use error::ClientError;
pub use http::HttpBackend;
