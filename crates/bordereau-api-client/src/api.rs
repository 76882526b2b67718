//! Domain methods for the back-office scan API.
//!
//! Response types are the explicit schemas from `bordereau_core::models`; anything the
//! server sends that does not fit them fails here, at the boundary.

use crate::ApiClient;
use bordereau_core::models::{
    Bordereau, DocumentType, DocumentTypeStats, ModifyBordereauRequest, MultiScanCapability,
    MutationResponse, ScanFile, ScanQueueItem, ScanStatistics, StartScanResponse, UploadResponse,
    UploadTarget,
};
use bordereau_core::{ScanError, ScanResult};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};

/// `scanType` value sent with additional uploads.
pub const ADDITIONAL_SCAN_TYPE: &str = "ADDITIONAL";

fn encode(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Build a multipart file part, keeping the content type the server validates against.
pub fn file_part(file: &ScanFile) -> ScanResult<Part> {
    Part::stream_with_length(Body::from(file.content.clone()), file.size())
        .file_name(file.file_name.clone())
        .mime_str(file.content_type())
        .map_err(|e| ScanError::InvalidInput(format!("Invalid content type: {}", e)))
}

/// Multipart body for both upload endpoints.
///
/// `files` and `fileTypes` are repeated fields appended in the same order, so the
/// n-th type always describes the n-th file.
pub fn upload_form(
    bordereau_id: &str,
    target: UploadTarget,
    files: &[(&ScanFile, DocumentType)],
    notes: Option<&str>,
) -> ScanResult<Form> {
    let mut form = Form::new();
    for (file, _) in files {
        form = form.part("files", file_part(file)?);
    }
    for (_, doc_type) in files {
        form = form.text("fileTypes", doc_type.as_str());
    }
    if let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) {
        form = form.text("notes", notes.to_string());
    }
    if target == UploadTarget::Additional {
        form = form
            .text("bordereauId", bordereau_id.to_string())
            .text("scanType", ADDITIONAL_SCAN_TYPE);
    }
    Ok(form)
}

impl ApiClient {
    /// List bordereaux awaiting manual scan.
    pub async fn scan_queue(&self) -> ScanResult<Vec<ScanQueueItem>> {
        self.get("/scan/manual/queue", &[]).await
    }

    /// Begin a manual scan session.
    pub async fn start_scan(&self, bordereau_id: &str) -> ScanResult<StartScanResponse> {
        self.post_empty(&format!("/scan/manual/start/{}", encode(bordereau_id)))
            .await
    }

    /// Fetch a bordereau without its relations (used to read its current status).
    pub async fn get_bordereau(&self, bordereau_id: &str) -> ScanResult<Bordereau> {
        self.get(&format!("/bordereaux/{}", encode(bordereau_id)), &[])
            .await
    }

    /// Fetch a bordereau with its documents and client.
    pub async fn bordereau_detail(&self, bordereau_id: &str) -> ScanResult<Bordereau> {
        self.get(
            &format!("/bordereaux/{}", encode(bordereau_id)),
            &[("include", "documents,client".to_string())],
        )
        .await
    }

    /// Upload typed files to the endpoint matching `target`.
    pub async fn upload_documents(
        &self,
        bordereau_id: &str,
        target: UploadTarget,
        files: &[(&ScanFile, DocumentType)],
        notes: Option<&str>,
    ) -> ScanResult<UploadResponse> {
        let path = match target {
            UploadTarget::Initial => format!("/scan/manual/upload/{}", encode(bordereau_id)),
            UploadTarget::Additional => {
                format!("/scan/manual/upload-additional/{}", encode(bordereau_id))
            }
        };
        let form = upload_form(bordereau_id, target, files, notes)?;
        self.post_multipart(&path, form).await
    }

    /// Mark a scan complete.
    pub async fn validate_scan(&self, bordereau_id: &str) -> ScanResult<MutationResponse> {
        self.send_ack(
            Method::PUT,
            &format!("/scan/manual/validate/{}", encode(bordereau_id)),
            None::<&()>,
        )
        .await
    }

    /// Abort a scan session.
    pub async fn cancel_scan(
        &self,
        bordereau_id: &str,
        reason: &str,
    ) -> ScanResult<MutationResponse> {
        self.send_ack(
            Method::PUT,
            &format!("/scan/manual/cancel/{}", encode(bordereau_id)),
            Some(&serde_json::json!({ "reason": reason })),
        )
        .await
    }

    /// Bordereaux rejected back to the scan stage.
    pub async fn rejected_bordereaux(&self) -> ScanResult<Vec<Bordereau>> {
        self.get(
            "/bordereaux",
            &[
                ("statut", "SCAN_EN_COURS".to_string()),
                ("documentStatus", "RETOUR_SCAN".to_string()),
            ],
        )
        .await
    }

    /// Replace the document named `document_name`. The server overwrites it.
    pub async fn replace_document(
        &self,
        bordereau_id: &str,
        document_name: &str,
        file: &ScanFile,
    ) -> ScanResult<MutationResponse> {
        let form = Form::new()
            .part("file", file_part(file)?)
            .text("documentName", document_name.to_string());
        self.post_multipart_ack(
            &format!("/scan/bordereau/{}/replace-document", encode(bordereau_id)),
            form,
        )
        .await
    }

    /// Add a document that was missing from the batch.
    pub async fn add_missing_document(
        &self,
        bordereau_id: &str,
        doc_type: DocumentType,
        file: &ScanFile,
    ) -> ScanResult<MutationResponse> {
        let form = Form::new()
            .part("file", file_part(file)?)
            .text("documentType", doc_type.as_str());
        self.post_multipart_ack(
            &format!("/scan/bordereau/{}/add-missing-document", encode(bordereau_id)),
            form,
        )
        .await
    }

    /// Correct reference and/or client of a bordereau.
    pub async fn modify_bordereau(
        &self,
        bordereau_id: &str,
        changes: &ModifyBordereauRequest,
    ) -> ScanResult<MutationResponse> {
        self.send_ack(
            Method::PATCH,
            &format!("/scan/bordereau/{}/modify", encode(bordereau_id)),
            Some(changes),
        )
        .await
    }

    /// Signal that the correction pass is done.
    pub async fn complete_corrections(&self, bordereau_id: &str) -> ScanResult<MutationResponse> {
        self.send_ack(
            Method::POST,
            &format!("/scan/bordereau/{}/complete-corrections", encode(bordereau_id)),
            None::<&()>,
        )
        .await
    }

    /// Scan counters for the current operator.
    pub async fn scan_statistics(&self) -> ScanResult<ScanStatistics> {
        self.get("/scan/manual/statistics", &[]).await
    }

    /// Whether another scan pass is allowed on a bordereau.
    pub async fn multi_scan_capability(
        &self,
        bordereau_id: &str,
    ) -> ScanResult<MultiScanCapability> {
        self.get(
            &format!("/scan/manual/multi-scan-capability/{}", encode(bordereau_id)),
            &[],
        )
        .await
    }

    /// Document counters per declared type.
    pub async fn document_type_stats(&self) -> ScanResult<DocumentTypeStats> {
        self.get("/scan/document-stats-by-type", &[]).await
    }
}
