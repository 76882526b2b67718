use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Declared business category of a scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    #[serde(alias = "BS")]
    BulletinSoin,
    #[serde(alias = "FACTURE")]
    ComplementInformation,
    Adhesion,
    Reclamation,
    #[serde(alias = "CONTRAT")]
    ContratAvenant,
    DemandeResiliation,
    ConventionTiersPayant,
}

impl DocumentType {
    pub const ALL: [DocumentType; 7] = [
        DocumentType::BulletinSoin,
        DocumentType::ComplementInformation,
        DocumentType::Adhesion,
        DocumentType::Reclamation,
        DocumentType::ContratAvenant,
        DocumentType::DemandeResiliation,
        DocumentType::ConventionTiersPayant,
    ];

    /// Wire name, as sent in `fileTypes` and `documentType` form fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::BulletinSoin => "BULLETIN_SOIN",
            DocumentType::ComplementInformation => "COMPLEMENT_INFORMATION",
            DocumentType::Adhesion => "ADHESION",
            DocumentType::Reclamation => "RECLAMATION",
            DocumentType::ContratAvenant => "CONTRAT_AVENANT",
            DocumentType::DemandeResiliation => "DEMANDE_RESILIATION",
            DocumentType::ConventionTiersPayant => "CONVENTION_TIERS_PAYANT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::BulletinSoin => "Bulletin de soin",
            DocumentType::ComplementInformation => "Complément d'information",
            DocumentType::Adhesion => "Adhésion",
            DocumentType::Reclamation => "Réclamation",
            DocumentType::ContratAvenant => "Contrat / avenant",
            DocumentType::DemandeResiliation => "Demande de résiliation",
            DocumentType::ConventionTiersPayant => "Convention tiers payant",
        }
    }
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = anyhow::Error;

    /// Case-insensitive; also accepts the legacy short names `BS`, `FACTURE` and `CONTRAT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "BULLETIN_SOIN" | "BS" => Ok(DocumentType::BulletinSoin),
            "COMPLEMENT_INFORMATION" | "FACTURE" => Ok(DocumentType::ComplementInformation),
            "ADHESION" => Ok(DocumentType::Adhesion),
            "RECLAMATION" => Ok(DocumentType::Reclamation),
            "CONTRAT_AVENANT" | "CONTRAT" => Ok(DocumentType::ContratAvenant),
            "DEMANDE_RESILIATION" => Ok(DocumentType::DemandeResiliation),
            "CONVENTION_TIERS_PAYANT" => Ok(DocumentType::ConventionTiersPayant),
            _ => Err(anyhow::anyhow!("Invalid document type: {}", s)),
        }
    }
}

/// Processing status of a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploaded,
    EnCours,
    Traite,
}

impl Display for DocumentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DocumentStatus::Uploaded => write!(f, "UPLOADED"),
            DocumentStatus::EnCours => write!(f, "EN_COURS"),
            DocumentStatus::Traite => write!(f, "TRAITE"),
        }
    }
}

/// One scanned artifact attached to a bordereau.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub doc_type: Option<DocumentType>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}
