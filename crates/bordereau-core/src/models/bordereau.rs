use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::document::Document;

/// Workflow status of a bordereau (`statut` on the wire).
///
/// Only the scan statuses are mutated by this client. Downstream statuses are kept
/// verbatim so that they survive a decode/encode cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BordereauStatus {
    AScanner,
    ScanEnCours,
    Scanne,
    AAffecter,
    Downstream(String),
}

impl BordereauStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BordereauStatus::AScanner => "A_SCANNER",
            BordereauStatus::ScanEnCours => "SCAN_EN_COURS",
            BordereauStatus::Scanne => "SCANNE",
            BordereauStatus::AAffecter => "A_AFFECTER",
            BordereauStatus::Downstream(s) => s.as_str(),
        }
    }
}

impl From<String> for BordereauStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "A_SCANNER" => BordereauStatus::AScanner,
            "SCAN_EN_COURS" => BordereauStatus::ScanEnCours,
            "SCANNE" => BordereauStatus::Scanne,
            "A_AFFECTER" => BordereauStatus::AAffecter,
            _ => BordereauStatus::Downstream(s),
        }
    }
}

impl From<BordereauStatus> for String {
    fn from(status: BordereauStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Display for BordereauStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Document status of a bordereau as a whole (`documentStatus` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BordereauDocumentStatus {
    Normal,
    /// Rejected by a team lead and sent back to the scan stage.
    RetourScan,
    Other(String),
}

impl BordereauDocumentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BordereauDocumentStatus::Normal => "NORMAL",
            BordereauDocumentStatus::RetourScan => "RETOUR_SCAN",
            BordereauDocumentStatus::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for BordereauDocumentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NORMAL" => BordereauDocumentStatus::Normal,
            "RETOUR_SCAN" => BordereauDocumentStatus::RetourScan,
            _ => BordereauDocumentStatus::Other(s),
        }
    }
}

impl From<BordereauDocumentStatus> for String {
    fn from(status: BordereauDocumentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Display for BordereauDocumentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
}

/// A batch of physical documents received from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bordereau {
    pub id: String,
    pub reference: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(rename = "statut", alias = "status")]
    pub status: BordereauStatus,
    #[serde(default)]
    pub document_status: Option<BordereauDocumentStatus>,
    #[serde(default)]
    pub date_reception: Option<DateTime<Utc>>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub client: Option<Client>,
}

impl Bordereau {
    pub fn is_returned_to_scan(&self) -> bool {
        self.status == BordereauStatus::ScanEnCours
            && self.document_status == Some(BordereauDocumentStatus::RetourScan)
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.name.as_str())
    }
}

/// Where a batch of files is sent, decided from the bordereau's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// First scan pass (`/scan/manual/upload/{id}`).
    Initial,
    /// Supplementary pass on a scan session already in progress
    /// (`/scan/manual/upload-additional/{id}`). The server appends documents.
    Additional,
}

impl UploadTarget {
    /// `None` when the bordereau is not a valid upload target.
    pub fn for_status(status: &BordereauStatus) -> Option<Self> {
        match status {
            BordereauStatus::AScanner => Some(UploadTarget::Initial),
            BordereauStatus::ScanEnCours => Some(UploadTarget::Additional),
            _ => None,
        }
    }
}
