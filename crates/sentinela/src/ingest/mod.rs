//! Getting files into staging: the local-scan folder and manual uploads.

pub mod scan;
pub mod upload;

pub use scan::{ScanEntry, ScanSelection};
pub use upload::{guess_mime, source_tag, UploadRequest, MANUAL_UPLOAD_TAG};
