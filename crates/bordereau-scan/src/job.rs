//! In-flight scan work.
//!
//! A [`ScanJob`] exists only while a request is outstanding. It is never persisted;
//! the server is the source of truth for what was uploaded or validated.

use bordereau_core::models::UploadTarget;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanJobKind {
    Upload {
        file_count: usize,
        target: Option<UploadTarget>,
    },
    Validation,
    Cancellation,
}

#[derive(Debug, Clone)]
pub struct ScanJob {
    pub id: Uuid,
    pub bordereau_id: String,
    pub kind: ScanJobKind,
    pub started_at: DateTime<Utc>,
}

impl ScanJob {
    fn new(bordereau_id: &str, kind: ScanJobKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            bordereau_id: bordereau_id.to_string(),
            kind,
            started_at: Utc::now(),
        }
    }

    pub fn upload(bordereau_id: &str, file_count: usize) -> Self {
        Self::new(
            bordereau_id,
            ScanJobKind::Upload {
                file_count,
                target: None,
            },
        )
    }

    pub fn validation(bordereau_id: &str) -> Self {
        Self::new(bordereau_id, ScanJobKind::Validation)
    }

    pub fn cancellation(bordereau_id: &str) -> Self {
        Self::new(bordereau_id, ScanJobKind::Cancellation)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}
