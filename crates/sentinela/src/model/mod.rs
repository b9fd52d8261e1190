//! Typed records exchanged with the backend.
//!
//! Every payload the console reads is decoded into one of these types at the
//! client boundary; nothing downstream deals with loosely shaped JSON.

pub mod document;
pub mod ingest;
pub mod staging;

pub use document::{
    AuditLogEntry, DocType, Document, DocumentSource, DocumentStatus, RegistryStats, Sphere,
};
pub use ingest::{
    IngestItem, ProcessReceipt, ProcessRequest, ScanFile, UploadForm, UploadReceipt,
};
pub use staging::{ApprovalRequest, ClassificationBranch, QueuedDocument, StagingDocument};

/// Lenient timestamp decoding.
///
/// The backend stores SQLite `CURRENT_TIMESTAMP` values (`2024-01-10 12:00:00`)
/// next to RFC 3339 strings, and reports "no value" as `"N/A"` or `"-"`.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    fn is_placeholder(s: &str) -> bool {
        matches!(s.trim(), "" | "-" | "N/A")
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(s) if is_placeholder(&s) => Ok(None),
                Some(s) => parse(&s)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", s))),
            }
        }
    }
}
