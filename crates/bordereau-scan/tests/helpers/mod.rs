//! Test helpers: an in-memory backend that records every call.
//!
//! The fake behaves like the server for the parts the workflow depends on: starting a
//! scan moves the bordereau to `SCAN_EN_COURS`, validating removes it from the queue,
//! completing corrections removes it from the rejected list.
//!
//! Run from workspace root: `cargo test -p bordereau-scan`.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use bordereau_core::models::{
    Bordereau, BordereauStatus, DocumentType, ModifyBordereauRequest, MutationResponse, ScanFile,
    ScanQueueItem, StartScanResponse, UploadResponse, UploadTarget, UploadedDocument,
};
use bordereau_core::{ScanError, ScanResult};
use bordereau_scan::ScanBackend;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ScanQueue,
    StartScan(String),
    BordereauStatus(String),
    Upload {
        bordereau_id: String,
        target: UploadTarget,
        files: Vec<String>,
        types: Vec<DocumentType>,
        notes: Option<String>,
    },
    Validate(String),
    Cancel {
        bordereau_id: String,
        reason: String,
    },
    RejectedList,
    Detail(String),
    Replace {
        bordereau_id: String,
        document_name: String,
        file_name: String,
    },
    AddMissing {
        bordereau_id: String,
        doc_type: DocumentType,
        file_name: String,
    },
    Modify {
        bordereau_id: String,
        changes: ModifyBordereauRequest,
    },
    Complete(String),
}

#[derive(Default)]
struct ServerState {
    queue: Vec<ScanQueueItem>,
    statuses: HashMap<String, BordereauStatus>,
    rejected: Vec<Bordereau>,
    details: HashMap<String, Bordereau>,
    failing_details: HashSet<String>,
    failing_ops: HashMap<&'static str, (u16, String)>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<ServerState>,
    calls: Mutex<Vec<Call>>,
    next_document: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue items start in `A_SCANNER`.
    pub fn with_queue(self, items: Vec<ScanQueueItem>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for item in &items {
                state
                    .statuses
                    .insert(item.id.clone(), BordereauStatus::AScanner);
            }
            state.queue = items;
        }
        self
    }

    pub fn with_status(self, bordereau_id: &str, status: BordereauStatus) -> Self {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(bordereau_id.to_string(), status);
        self
    }

    /// Rejected bordereaux as listed, plus their detail responses.
    pub fn with_rejected(self, listed: Vec<Bordereau>, details: Vec<Bordereau>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.rejected = listed;
            for detail in details {
                state.details.insert(detail.id.clone(), detail);
            }
        }
        self
    }

    pub fn failing_detail(self, bordereau_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_details
            .insert(bordereau_id.to_string());
        self
    }

    /// Make operation `op` fail with an API error carrying `message`.
    pub fn fail_op(&self, op: &'static str, status: u16, message: &str) {
        let body = serde_json::json!({ "statusCode": status, "message": message }).to_string();
        self.state
            .lock()
            .unwrap()
            .failing_ops
            .insert(op, (status, body));
    }

    pub fn heal_op(&self, op: &'static str) {
        self.state.lock().unwrap().failing_ops.remove(op);
    }

    pub fn set_detail(&self, detail: Bordereau) {
        self.state
            .lock()
            .unwrap()
            .details
            .insert(detail.id.clone(), detail);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn uploads(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Upload { .. }))
            .collect()
    }

    pub fn status_of(&self, bordereau_id: &str) -> Option<BordereauStatus> {
        self.state.lock().unwrap().statuses.get(bordereau_id).cloned()
    }

    fn record(&self, op: &'static str, call: Call) -> ScanResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.state.lock().unwrap().failing_ops.get(op) {
            Some((status, body)) => Err(ScanError::from_status(*status, body.clone())),
            None => Ok(()),
        }
    }

    fn ack(message: &str) -> MutationResponse {
        MutationResponse {
            success: true,
            message: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl ScanBackend for FakeBackend {
    async fn scan_queue(&self) -> ScanResult<Vec<ScanQueueItem>> {
        self.record("scan_queue", Call::ScanQueue)?;
        Ok(self.state.lock().unwrap().queue.clone())
    }

    async fn start_scan(&self, bordereau_id: &str) -> ScanResult<StartScanResponse> {
        self.record("start_scan", Call::StartScan(bordereau_id.to_string()))?;
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(bordereau_id.to_string(), BordereauStatus::ScanEnCours);
        Ok(StartScanResponse {
            success: true,
            message: Some("Scan process started successfully".to_string()),
            bordereau: None,
        })
    }

    async fn bordereau_status(&self, bordereau_id: &str) -> ScanResult<BordereauStatus> {
        self.record(
            "bordereau_status",
            Call::BordereauStatus(bordereau_id.to_string()),
        )?;
        self.status_of(bordereau_id)
            .ok_or_else(|| ScanError::from_status(404, r#"{"message":"Bordereau not found"}"#.to_string()))
    }

    async fn upload_documents(
        &self,
        bordereau_id: &str,
        target: UploadTarget,
        files: &[(&ScanFile, DocumentType)],
        notes: Option<&str>,
    ) -> ScanResult<UploadResponse> {
        self.record(
            "upload_documents",
            Call::Upload {
                bordereau_id: bordereau_id.to_string(),
                target,
                files: files.iter().map(|(f, _)| f.file_name.clone()).collect(),
                types: files.iter().map(|(_, t)| *t).collect(),
                notes: notes.map(str::to_string),
            },
        )?;
        let uploaded_documents = files
            .iter()
            .map(|(file, doc_type)| UploadedDocument {
                id: format!("doc-{}", self.next_document.fetch_add(1, Ordering::SeqCst) + 1),
                name: file.file_name.clone(),
                doc_type: Some(*doc_type),
                size: file.size(),
            })
            .collect::<Vec<_>>();
        Ok(UploadResponse {
            success: true,
            message: Some(format!(
                "{} documents uploaded successfully",
                uploaded_documents.len()
            )),
            uploaded_documents,
            errors: Vec::new(),
        })
    }

    async fn validate_scan(&self, bordereau_id: &str) -> ScanResult<MutationResponse> {
        self.record("validate_scan", Call::Validate(bordereau_id.to_string()))?;
        let mut state = self.state.lock().unwrap();
        state.queue.retain(|item| item.id != bordereau_id);
        state
            .statuses
            .insert(bordereau_id.to_string(), BordereauStatus::Scanne);
        Ok(Self::ack("Scan validated successfully"))
    }

    async fn cancel_scan(
        &self,
        bordereau_id: &str,
        reason: &str,
    ) -> ScanResult<MutationResponse> {
        self.record(
            "cancel_scan",
            Call::Cancel {
                bordereau_id: bordereau_id.to_string(),
                reason: reason.to_string(),
            },
        )?;
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(bordereau_id.to_string(), BordereauStatus::AScanner);
        Ok(Self::ack("Scan cancelled. Bordereau returned to scan queue."))
    }

    async fn rejected_bordereaux(&self) -> ScanResult<Vec<Bordereau>> {
        self.record("rejected_bordereaux", Call::RejectedList)?;
        Ok(self.state.lock().unwrap().rejected.clone())
    }

    async fn bordereau_detail(&self, bordereau_id: &str) -> ScanResult<Bordereau> {
        self.record("bordereau_detail", Call::Detail(bordereau_id.to_string()))?;
        let state = self.state.lock().unwrap();
        if state.failing_details.contains(bordereau_id) {
            return Err(ScanError::from_status(
                500,
                r#"{"message":"Internal server error"}"#.to_string(),
            ));
        }
        state
            .details
            .get(bordereau_id)
            .cloned()
            .ok_or_else(|| ScanError::from_status(404, r#"{"message":"Bordereau not found"}"#.to_string()))
    }

    async fn replace_document(
        &self,
        bordereau_id: &str,
        document_name: &str,
        file: &ScanFile,
    ) -> ScanResult<MutationResponse> {
        self.record(
            "replace_document",
            Call::Replace {
                bordereau_id: bordereau_id.to_string(),
                document_name: document_name.to_string(),
                file_name: file.file_name.clone(),
            },
        )?;
        Ok(Self::ack("Document replaced"))
    }

    async fn add_missing_document(
        &self,
        bordereau_id: &str,
        doc_type: DocumentType,
        file: &ScanFile,
    ) -> ScanResult<MutationResponse> {
        self.record(
            "add_missing_document",
            Call::AddMissing {
                bordereau_id: bordereau_id.to_string(),
                doc_type,
                file_name: file.file_name.clone(),
            },
        )?;
        Ok(Self::ack("Document added"))
    }

    async fn modify_bordereau(
        &self,
        bordereau_id: &str,
        changes: &ModifyBordereauRequest,
    ) -> ScanResult<MutationResponse> {
        self.record(
            "modify_bordereau",
            Call::Modify {
                bordereau_id: bordereau_id.to_string(),
                changes: changes.clone(),
            },
        )?;
        Ok(Self::ack("Bordereau modified"))
    }

    async fn complete_corrections(&self, bordereau_id: &str) -> ScanResult<MutationResponse> {
        self.record("complete_corrections", Call::Complete(bordereau_id.to_string()))?;
        self.state
            .lock()
            .unwrap()
            .rejected
            .retain(|b| b.id != bordereau_id);
        Ok(Self::ack("Corrections completed"))
    }
}
