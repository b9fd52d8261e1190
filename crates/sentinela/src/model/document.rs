//! Registry-side document records and their classification vocabulary.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a document entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    #[serde(alias = "user_upload", alias = "user", alias = "manual", alias = "admin")]
    ManualUpload,
    #[serde(alias = "diario_oficial", alias = "querido_diario")]
    OfficialGazette,
    #[serde(alias = "local_ingest")]
    LocalScan,
    #[serde(other)]
    Other,
}

impl DocumentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSource::ManualUpload => "manual_upload",
            DocumentSource::OfficialGazette => "official_gazette",
            DocumentSource::LocalScan => "local_scan",
            DocumentSource::Other => "other",
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status as reported by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    #[serde(alias = "approved")]
    Queued,
    Active,
    #[serde(alias = "failed")]
    Error,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::Pending => write!(f, "pending"),
            DocumentStatus::Queued => write!(f, "queued"),
            DocumentStatus::Active => write!(f, "active"),
            DocumentStatus::Error => write!(f, "error"),
        }
    }
}

/// Jurisdictional level of a legislative document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sphere {
    Municipal,
    Estadual,
    Federal,
    Geral,
    #[serde(alias = "desconhecida")]
    Unknown,
}

impl Sphere {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sphere::Municipal => "municipal",
            Sphere::Estadual => "estadual",
            Sphere::Federal => "federal",
            Sphere::Geral => "geral",
            Sphere::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Sphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sphere {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "municipal" => Ok(Sphere::Municipal),
            "estadual" | "state" => Ok(Sphere::Estadual),
            "federal" => Ok(Sphere::Federal),
            "geral" => Ok(Sphere::Geral),
            "unknown" | "desconhecida" => Ok(Sphere::Unknown),
            other => Err(format!("unknown sphere '{}'", other)),
        }
    }
}

/// Document type tag.
///
/// The backend vocabulary is open-ended, so unrecognized tags survive as
/// [`DocType::Other`] instead of failing the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocType {
    Constituicao,
    LeiComplementar,
    LeiOrdinaria,
    MedidaProvisoria,
    Decreto,
    Portaria,
    Resolucao,
    DiarioOficial,
    DocumentoGeral,
    Denuncia,
    Tabela,
    Generico,
    Documento,
    /// Coarse "this is legislation" tag assigned at discovery time.
    Legislacao,
    /// Coarse "this is a gazette" tag assigned at discovery time.
    Diario,
    PendingClassification,
    Other(String),
}

/// Suggested types that route a discovered document to the legislation branch.
pub const LEGISLATIVE_SUGGESTIONS: &[DocType] = &[
    DocType::Legislacao,
    DocType::Diario,
    DocType::LeiOrdinaria,
    DocType::Decreto,
    DocType::Portaria,
];

impl DocType {
    pub fn as_str(&self) -> &str {
        match self {
            DocType::Constituicao => "constituicao",
            DocType::LeiComplementar => "lei_complementar",
            DocType::LeiOrdinaria => "lei_ordinaria",
            DocType::MedidaProvisoria => "medida_provisoria",
            DocType::Decreto => "decreto",
            DocType::Portaria => "portaria",
            DocType::Resolucao => "resolucao",
            DocType::DiarioOficial => "diario_oficial",
            DocType::DocumentoGeral => "documento_geral",
            DocType::Denuncia => "denuncia",
            DocType::Tabela => "tabela",
            DocType::Generico => "generico",
            DocType::Documento => "documento",
            DocType::Legislacao => "legislacao",
            DocType::Diario => "diario",
            DocType::PendingClassification => "pending_classification",
            DocType::Other(tag) => tag.as_str(),
        }
    }

    /// Returns true when a discovery-time suggestion of this type implies the
    /// legislation branch.
    pub fn suggests_legislation(&self) -> bool {
        LEGISLATIVE_SUGGESTIONS.contains(self)
    }

    /// Returns true for every type that belongs to the legal hierarchy.
    pub fn is_legislative(&self) -> bool {
        matches!(
            self,
            DocType::Constituicao
                | DocType::LeiComplementar
                | DocType::LeiOrdinaria
                | DocType::MedidaProvisoria
                | DocType::Decreto
                | DocType::Portaria
                | DocType::Resolucao
                | DocType::DiarioOficial
                | DocType::Legislacao
                | DocType::Diario
        )
    }
}

impl From<String> for DocType {
    fn from(value: String) -> Self {
        match value.trim() {
            "constituicao" => DocType::Constituicao,
            "lei_complementar" => DocType::LeiComplementar,
            "lei_ordinaria" => DocType::LeiOrdinaria,
            "medida_provisoria" => DocType::MedidaProvisoria,
            "decreto" => DocType::Decreto,
            "portaria" => DocType::Portaria,
            "resolucao" => DocType::Resolucao,
            "diario_oficial" => DocType::DiarioOficial,
            "documento_geral" => DocType::DocumentoGeral,
            "denuncia" => DocType::Denuncia,
            "tabela" => DocType::Tabela,
            "generico" => DocType::Generico,
            "documento" => DocType::Documento,
            "legislacao" => DocType::Legislacao,
            "diario" => DocType::Diario,
            "pending_classification" => DocType::PendingClassification,
            _ => DocType::Other(value),
        }
    }
}

impl From<&str> for DocType {
    fn from(value: &str) -> Self {
        DocType::from(value.to_string())
    }
}

impl From<DocType> for String {
    fn from(value: DocType) -> Self {
        match value {
            DocType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document as listed by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub source: Option<DocumentSource>,
    #[serde(default)]
    pub doc_type: Option<DocType>,
    #[serde(default)]
    pub sphere: Option<Sphere>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// Ingestion method tag (e.g. `docling`, `html_law_parser`).
    #[serde(default)]
    pub ocr_method: Option<String>,
    #[serde(default)]
    pub ementa: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub custom_tags: Option<String>,
}

impl Document {
    pub fn is_active(&self) -> bool {
        self.status == DocumentStatus::Active
    }
}

/// One audit trail entry from the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(default, deserialize_with = "super::timestamp::option::deserialize")]
    pub timestamp: Option<DateTime<Utc>>,
    pub action: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

/// Dashboard statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_documents: u64,
    #[serde(default, deserialize_with = "super::timestamp::option::deserialize")]
    pub last_ingestion: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources: HashMap<String, u64>,
    #[serde(default)]
    pub audit_logs: Vec<AuditLogEntry>,
}
