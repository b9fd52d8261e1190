pub mod batch;
pub mod broadcast;
pub mod client;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod registry;
pub mod sanitize;
pub mod staging;

pub use batch::{BatchOutcome, BatchProcessor, BatchRun, ItemError, Pacer};
pub use broadcast::{BatchProgressBroadcaster, JobProgressBroadcaster, MonitorEvent};
pub use client::{
    Activator, ClientError, HttpBackend, IngestApi, LogSource, RegistryApi, StagingApi,
};
pub use config::{load_config, load_or_default, ConsoleConfig};
pub use error::{ConfigError, IngestError, Result, SentinelaError};
pub use ingest::{ScanSelection, UploadRequest};
pub use logging::init_tracing;
pub use monitor::{
    map_progress, JobMonitor, LogTailFeed, MonitorHandle, MonitorSettings, MonitorSlot,
    ProgressEstimate, ProgressFeed,
};
pub use registry::{DeleteOutcome, DeleteReport, DocumentRegistry};
pub use staging::{StagingClassifier, StagingReview, ValidationError};
