//! Upload orchestration.
//!
//! An upload is checked locally first (non-empty, every file typed) so nothing is sent
//! for an incomplete selection. The bordereau's current status is then read from the
//! server and decides the endpoint: `A_SCANNER` takes the initial upload,
//! `SCAN_EN_COURS` takes an additional one, anything else is refused.

use crate::backend::ScanBackend;
use crate::selection::FileSelection;
use crate::Callback;
use bordereau_core::models::{UploadFileError, UploadTarget};
use bordereau_core::{ScanError, ScanResult};
use std::sync::Arc;

/// What the server confirmed for one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub bordereau_id: String,
    pub target: UploadTarget,
    pub document_ids: Vec<String>,
    pub message: Option<String>,
    /// Per-file failures the server reported alongside an overall success.
    pub file_errors: Vec<UploadFileError>,
}

pub struct DocumentUploader<B: ?Sized> {
    backend: Arc<B>,
    on_complete: Option<Callback<UploadOutcome>>,
}

impl<B: ?Sized> Clone for DocumentUploader<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            on_complete: self.on_complete.clone(),
        }
    }
}

impl<B: ScanBackend + ?Sized> DocumentUploader<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            on_complete: None,
        }
    }

    /// Run `callback` after each confirmed upload. Failed uploads never trigger it.
    pub fn with_completion(mut self, callback: Callback<UploadOutcome>) -> Self {
        self.on_complete = Some(callback);
        self
    }

    /// Endpoint for the bordereau's current server-side status.
    pub async fn resolve_target(&self, bordereau_id: &str) -> ScanResult<UploadTarget> {
        let status = self.backend.bordereau_status(bordereau_id).await?;
        UploadTarget::for_status(&status).ok_or_else(|| ScanError::InvalidUploadTarget {
            bordereau_id: bordereau_id.to_string(),
            status: status.to_string(),
        })
    }

    /// Validate, pick the endpoint, and upload.
    #[tracing::instrument(skip(self, selection, notes), fields(files = selection.len()))]
    pub async fn upload(
        &self,
        bordereau_id: &str,
        selection: &FileSelection,
        notes: Option<&str>,
    ) -> ScanResult<UploadOutcome> {
        selection.typed_files()?;
        let target = self.resolve_target(bordereau_id).await?;
        self.upload_to(bordereau_id, target, selection, notes).await
    }

    /// Upload to an endpoint already chosen with [`Self::resolve_target`].
    pub async fn upload_to(
        &self,
        bordereau_id: &str,
        target: UploadTarget,
        selection: &FileSelection,
        notes: Option<&str>,
    ) -> ScanResult<UploadOutcome> {
        let files = selection.typed_files()?;
        for warning in selection.warnings() {
            tracing::warn!(bordereau_id, warning = %warning, "File may be refused by the server");
        }

        let response = self
            .backend
            .upload_documents(bordereau_id, target, &files, notes)
            .await?;

        if !response.success {
            let message = response.message.clone().unwrap_or_else(|| {
                response
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.file_name, e.error))
                    .collect::<Vec<_>>()
                    .join("; ")
            });
            return Err(ScanError::Rejected(message));
        }

        let outcome = UploadOutcome {
            bordereau_id: bordereau_id.to_string(),
            target,
            document_ids: response.document_ids(),
            message: response.message,
            file_errors: response.errors,
        };

        tracing::info!(
            bordereau_id,
            target = ?target,
            documents = outcome.document_ids.len(),
            failed = outcome.file_errors.len(),
            "Documents uploaded"
        );

        if let Some(callback) = &self.on_complete {
            callback(&outcome);
        }
        Ok(outcome)
    }
}
