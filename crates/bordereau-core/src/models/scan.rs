//! Request and response schemas of the manual scan endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::bordereau::Bordereau;
use super::document::{DocumentStatus, DocumentType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanPriority {
    High,
    Medium,
    Low,
}

impl Display for ScanPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ScanPriority::High => write!(f, "HIGH"),
            ScanPriority::Medium => write!(f, "MEDIUM"),
            ScanPriority::Low => write!(f, "LOW"),
        }
    }
}

/// One entry of `GET /scan/manual/queue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanQueueItem {
    pub id: String,
    pub reference: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub date_reception: Option<DateTime<Utc>>,
    #[serde(rename = "nombreBS", default)]
    pub nombre_bs: u32,
    #[serde(default)]
    pub delai_reglement: Option<u32>,
    #[serde(default)]
    pub documents_count: u32,
    #[serde(default = "default_can_scan")]
    pub can_scan: bool,
    #[serde(default)]
    pub priority: Option<ScanPriority>,
}

fn default_can_scan() -> bool {
    true
}

/// Generic `{success, message}` acknowledgement returned by most mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Response of `POST /scan/manual/start/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartScanResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub bordereau: Option<Bordereau>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub doc_type: Option<DocumentType>,
    #[serde(default)]
    pub size: u64,
}

/// Per-file failure reported by the server inside an otherwise accepted upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileError {
    pub file_name: String,
    pub error: String,
}

/// Response of both upload endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub uploaded_documents: Vec<UploadedDocument>,
    #[serde(default)]
    pub errors: Vec<UploadFileError>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    pub fn document_ids(&self) -> Vec<String> {
        self.uploaded_documents.iter().map(|d| d.id.clone()).collect()
    }
}

/// Body of `PATCH /scan/bordereau/{id}/modify`. Only changed fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyBordereauRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl ModifyBordereauRequest {
    pub fn is_empty(&self) -> bool {
        self.reference.is_none() && self.client_id.is_none()
    }
}

/// Response of `GET /scan/manual/statistics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatistics {
    pub queue_count: u64,
    pub in_progress_count: u64,
    pub completed_today: u64,
    pub user_scans_today: u64,
    /// Percentage, 0..=100.
    pub efficiency: u32,
}

/// Response of `GET /scan/manual/multi-scan-capability/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiScanCapability {
    pub can_scan_multiple: bool,
    pub current_scan_count: u32,
    pub max_scans_allowed: u32,
    pub is_valid: bool,
    pub message: String,
    #[serde(default)]
    pub documents_count: u32,
}

/// Counters of one document type in `GET /scan/document-stats-by-type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeCounts {
    #[serde(default)]
    pub a_scanner: u64,
    #[serde(default)]
    pub en_cours: u64,
    #[serde(default)]
    pub scanne: u64,
}

/// `GET /scan/document-stats-by-type`, keyed by document type wire name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentTypeStats(pub BTreeMap<String, DocumentTypeCounts>);

impl DocumentTypeStats {
    /// Counts per document status for each known document type. Unknown keys are skipped.
    pub fn status_breakdown(&self) -> BTreeMap<DocumentType, BTreeMap<DocumentStatus, u64>> {
        self.0
            .iter()
            .filter_map(|(key, counts)| {
                let doc_type = key.parse::<DocumentType>().ok()?;
                let mut by_status = BTreeMap::new();
                by_status.insert(DocumentStatus::Uploaded, counts.a_scanner);
                by_status.insert(DocumentStatus::EnCours, counts.en_cours);
                by_status.insert(DocumentStatus::Traite, counts.scanne);
                Some((doc_type, by_status))
            })
            .collect()
    }
}
