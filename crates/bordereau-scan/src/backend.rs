//! Backend abstraction for the scan workflow.

use async_trait::async_trait;
use bordereau_api_client::ApiClient;
use bordereau_core::models::{
    Bordereau, BordereauStatus, DocumentType, ModifyBordereauRequest, MutationResponse, ScanFile,
    ScanQueueItem, StartScanResponse, UploadResponse, UploadTarget,
};
use bordereau_core::{ScanError, ScanResult};

/// Remote operations used by the workflow.
///
/// The production implementation is [`ApiClient`]; tests substitute an in-memory
/// backend that records calls.
#[async_trait]
pub trait ScanBackend: Send + Sync {
    async fn scan_queue(&self) -> ScanResult<Vec<ScanQueueItem>>;

    async fn start_scan(&self, bordereau_id: &str) -> ScanResult<StartScanResponse>;

    /// Current status of a bordereau, read fresh from the server.
    async fn bordereau_status(&self, bordereau_id: &str) -> ScanResult<BordereauStatus>;

    async fn upload_documents(
        &self,
        bordereau_id: &str,
        target: UploadTarget,
        files: &[(&ScanFile, DocumentType)],
        notes: Option<&str>,
    ) -> ScanResult<UploadResponse>;

    async fn validate_scan(&self, bordereau_id: &str) -> ScanResult<MutationResponse>;

    async fn cancel_scan(&self, bordereau_id: &str, reason: &str)
        -> ScanResult<MutationResponse>;

    async fn rejected_bordereaux(&self) -> ScanResult<Vec<Bordereau>>;

    async fn bordereau_detail(&self, bordereau_id: &str) -> ScanResult<Bordereau>;

    async fn replace_document(
        &self,
        bordereau_id: &str,
        document_name: &str,
        file: &ScanFile,
    ) -> ScanResult<MutationResponse>;

    async fn add_missing_document(
        &self,
        bordereau_id: &str,
        doc_type: DocumentType,
        file: &ScanFile,
    ) -> ScanResult<MutationResponse>;

    async fn modify_bordereau(
        &self,
        bordereau_id: &str,
        changes: &ModifyBordereauRequest,
    ) -> ScanResult<MutationResponse>;

    async fn complete_corrections(&self, bordereau_id: &str) -> ScanResult<MutationResponse>;
}

/// Turn a `{success: false}` acknowledgement into an error.
pub(crate) fn ensure_ack(ack: MutationResponse) -> ScanResult<MutationResponse> {
    if ack.success {
        Ok(ack)
    } else {
        Err(ScanError::Rejected(ack.message.unwrap_or_default()))
    }
}

#[async_trait]
impl ScanBackend for ApiClient {
    async fn scan_queue(&self) -> ScanResult<Vec<ScanQueueItem>> {
        ApiClient::scan_queue(self).await
    }

    async fn start_scan(&self, bordereau_id: &str) -> ScanResult<StartScanResponse> {
        ApiClient::start_scan(self, bordereau_id).await
    }

    async fn bordereau_status(&self, bordereau_id: &str) -> ScanResult<BordereauStatus> {
        Ok(self.get_bordereau(bordereau_id).await?.status)
    }

    async fn upload_documents(
        &self,
        bordereau_id: &str,
        target: UploadTarget,
        files: &[(&ScanFile, DocumentType)],
        notes: Option<&str>,
    ) -> ScanResult<UploadResponse> {
        ApiClient::upload_documents(self, bordereau_id, target, files, notes).await
    }

    async fn validate_scan(&self, bordereau_id: &str) -> ScanResult<MutationResponse> {
        ApiClient::validate_scan(self, bordereau_id).await
    }

    async fn cancel_scan(
        &self,
        bordereau_id: &str,
        reason: &str,
    ) -> ScanResult<MutationResponse> {
        ApiClient::cancel_scan(self, bordereau_id, reason).await
    }

    async fn rejected_bordereaux(&self) -> ScanResult<Vec<Bordereau>> {
        ApiClient::rejected_bordereaux(self).await
    }

    async fn bordereau_detail(&self, bordereau_id: &str) -> ScanResult<Bordereau> {
        ApiClient::bordereau_detail(self, bordereau_id).await
    }

    async fn replace_document(
        &self,
        bordereau_id: &str,
        document_name: &str,
        file: &ScanFile,
    ) -> ScanResult<MutationResponse> {
        ApiClient::replace_document(self, bordereau_id, document_name, file).await
    }

    async fn add_missing_document(
        &self,
        bordereau_id: &str,
        doc_type: DocumentType,
        file: &ScanFile,
    ) -> ScanResult<MutationResponse> {
        ApiClient::add_missing_document(self, bordereau_id, doc_type, file).await
    }

    async fn modify_bordereau(
        &self,
        bordereau_id: &str,
        changes: &ModifyBordereauRequest,
    ) -> ScanResult<MutationResponse> {
        ApiClient::modify_bordereau(self, bordereau_id, changes).await
    }

    async fn complete_corrections(&self, bordereau_id: &str) -> ScanResult<MutationResponse> {
        ApiClient::complete_corrections(self, bordereau_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_ack() {
        let ok = MutationResponse {
            success: true,
            message: Some("done".to_string()),
        };
        assert!(ensure_ack(ok).is_ok());

        let refused = MutationResponse {
            success: false,
            message: Some("Bordereau not found".to_string()),
        };
        match ensure_ack(refused) {
            Err(ScanError::Rejected(msg)) => assert_eq!(msg, "Bordereau not found"),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }
}
