//! Scan session lifecycle.
//!
//! ```text
//! Select --start_scan--> Upload --upload--> Validate --validate--> Select
//!                          |                   |
//!                          +------cancel-------+-----------------> Select
//! ```
//!
//! A failed action leaves the step, the selected bordereau, the files and the notes
//! exactly as they were, so the operator can retry.

use crate::backend::{ensure_ack, ScanBackend};
use crate::job::{ScanJob, ScanJobKind};
use crate::notice::{report_failure, Notice};
use crate::poller::PollSource;
use crate::query::{QueryClient, QueryKey};
use crate::selection::FileSelection;
use crate::upload::{DocumentUploader, UploadOutcome};
use crate::Callback;
use async_trait::async_trait;
use bordereau_core::models::{MutationResponse, ScanQueueItem};
use bordereau_core::{ScanError, ScanResult};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    Select,
    Upload,
    Validate,
}

impl ScanStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStep::Select => "select",
            ScanStep::Upload => "upload",
            ScanStep::Validate => "validate",
        }
    }
}

impl fmt::Display for ScanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan queue as a [`PollSource`].
pub struct ScanQueueSource<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> ScanQueueSource<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: ScanBackend + ?Sized + 'static> PollSource for ScanQueueSource<B> {
    type Output = Vec<ScanQueueItem>;

    fn key(&self) -> QueryKey {
        QueryKey::ScanQueue
    }

    async fn fetch(&self) -> ScanResult<Vec<ScanQueueItem>> {
        self.backend.scan_queue().await
    }
}

pub struct ScanSession<B: ?Sized> {
    backend: Arc<B>,
    queries: QueryClient,
    uploader: DocumentUploader<B>,
    step: ScanStep,
    bordereau: Option<ScanQueueItem>,
    selection: FileSelection,
    notes: String,
    job: Option<ScanJob>,
    last_upload: Option<UploadOutcome>,
    notice: Option<Notice>,
}

impl<B: ScanBackend + ?Sized> ScanSession<B> {
    pub fn new(backend: Arc<B>, queries: QueryClient) -> Self {
        Self {
            uploader: DocumentUploader::new(Arc::clone(&backend)),
            backend,
            queries,
            step: ScanStep::Select,
            bordereau: None,
            selection: FileSelection::new(),
            notes: String::new(),
            job: None,
            last_upload: None,
            notice: None,
        }
    }

    /// Run `callback` after every confirmed upload.
    pub fn on_upload_complete(mut self, callback: Callback<UploadOutcome>) -> Self {
        self.uploader = self.uploader.with_completion(callback);
        self
    }

    pub fn step(&self) -> ScanStep {
        self.step
    }

    pub fn bordereau(&self) -> Option<&ScanQueueItem> {
        self.bordereau.as_ref()
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut FileSelection {
        &mut self.selection
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Request in flight, if any. Front-ends disable the triggering control while set.
    pub fn current_job(&self) -> Option<&ScanJob> {
        self.job.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    pub fn last_upload(&self) -> Option<&UploadOutcome> {
        self.last_upload.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Start scanning `item`. Only allowed from [`ScanStep::Select`].
    #[tracing::instrument(skip(self, item), fields(bordereau_id = %item.id))]
    pub async fn start_scan(&mut self, item: ScanQueueItem) -> ScanResult<()> {
        self.require_step(ScanStep::Select, "start a scan")?;

        let result = self.backend.start_scan(&item.id).await.and_then(|r| {
            ensure_ack(MutationResponse {
                success: r.success,
                message: r.message,
            })
        });
        match result {
            Ok(ack) => {
                tracing::info!(reference = %item.reference, "Scan started");
                self.notice = Some(Notice::success(
                    ack.message
                        .unwrap_or_else(|| format!("Scan started for {}", item.reference)),
                ));
                self.bordereau = Some(item);
                self.step = ScanStep::Upload;
                self.queries.invalidate(QueryKey::ScanQueue);
                Ok(())
            }
            Err(e) => Err(self.fail("start_scan", e)),
        }
    }

    /// Upload the selected files. Only allowed from [`ScanStep::Upload`].
    ///
    /// Selection problems are reported before any request is made.
    #[tracing::instrument(skip(self))]
    pub async fn upload(&mut self) -> ScanResult<UploadOutcome> {
        self.require_step(ScanStep::Upload, "upload documents")?;
        let bordereau_id = self.selected_id()?;
        if let Err(e) = self.selection.typed_files() {
            return Err(self.fail("upload", e));
        }

        self.job = Some(ScanJob::upload(&bordereau_id, self.selection.len()));
        let result = self.run_upload(&bordereau_id).await;
        self.job = None;

        match result {
            Ok(outcome) => {
                let uploaded = outcome.document_ids.len();
                self.notice = Some(if outcome.file_errors.is_empty() {
                    Notice::success(format!("{} document(s) uploaded", uploaded))
                } else {
                    Notice::warning(format!(
                        "{} document(s) uploaded, {} failed",
                        uploaded,
                        outcome.file_errors.len()
                    ))
                });
                self.selection.clear();
                self.last_upload = Some(outcome.clone());
                self.step = ScanStep::Validate;
                self.queries.invalidate(QueryKey::ScanQueue);
                Ok(outcome)
            }
            Err(e) => Err(self.fail("upload", e)),
        }
    }

    async fn run_upload(&mut self, bordereau_id: &str) -> ScanResult<UploadOutcome> {
        let target = self.uploader.resolve_target(bordereau_id).await?;
        if let Some(ScanJob {
            kind: ScanJobKind::Upload { target: slot, .. },
            ..
        }) = self.job.as_mut()
        {
            *slot = Some(target);
        }
        let notes = Some(self.notes.as_str()).filter(|n| !n.trim().is_empty());
        self.uploader
            .upload_to(bordereau_id, target, &self.selection, notes)
            .await
    }

    /// Mark the scan complete. Only allowed from [`ScanStep::Validate`].
    #[tracing::instrument(skip(self))]
    pub async fn validate(&mut self) -> ScanResult<()> {
        self.require_step(ScanStep::Validate, "validate")?;
        let bordereau_id = self.selected_id()?;

        self.job = Some(ScanJob::validation(&bordereau_id));
        let result = self
            .backend
            .validate_scan(&bordereau_id)
            .await
            .and_then(ensure_ack);
        self.job = None;

        match result {
            Ok(ack) => {
                tracing::info!(bordereau_id = %bordereau_id, "Scan validated");
                self.notice = Some(Notice::success(
                    ack.message.unwrap_or_else(|| "Scan validated".to_string()),
                ));
                self.reset();
                self.queries
                    .invalidate_all(&[QueryKey::ScanQueue, QueryKey::CompletedScans]);
                Ok(())
            }
            Err(e) => Err(self.fail("validate", e)),
        }
    }

    /// Abort the session. Requires a non-blank reason; a blank one sends nothing.
    #[tracing::instrument(skip(self, reason))]
    pub async fn cancel(&mut self, reason: &str) -> ScanResult<()> {
        if self.step == ScanStep::Select {
            return Err(self.fail(
                "cancel",
                ScanError::InvalidStep {
                    action: "cancel",
                    step: self.step.to_string(),
                },
            ));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(self.fail("cancel", ScanError::MissingCancelReason));
        }
        let bordereau_id = self.selected_id()?;

        self.job = Some(ScanJob::cancellation(&bordereau_id));
        let result = self
            .backend
            .cancel_scan(&bordereau_id, reason)
            .await
            .and_then(ensure_ack);
        self.job = None;

        match result {
            Ok(ack) => {
                tracing::info!(bordereau_id = %bordereau_id, reason, "Scan cancelled");
                self.notice = Some(Notice::success(
                    ack.message.unwrap_or_else(|| "Scan cancelled".to_string()),
                ));
                self.reset();
                self.queries.invalidate(QueryKey::ScanQueue);
                Ok(())
            }
            Err(e) => Err(self.fail("cancel", e)),
        }
    }

    fn reset(&mut self) {
        self.step = ScanStep::Select;
        self.bordereau = None;
        self.selection.clear();
        self.notes.clear();
        self.last_upload = None;
    }

    fn require_step(&mut self, expected: ScanStep, action: &'static str) -> ScanResult<()> {
        if self.step == expected {
            return Ok(());
        }
        let err = ScanError::InvalidStep {
            action,
            step: self.step.to_string(),
        };
        Err(self.fail(action, err))
    }

    fn selected_id(&mut self) -> ScanResult<String> {
        match &self.bordereau {
            Some(item) => Ok(item.id.clone()),
            None => Err(self.fail("select", ScanError::NoBordereauSelected)),
        }
    }

    fn fail(&mut self, action: &'static str, err: ScanError) -> ScanError {
        self.notice = Some(report_failure(action, &err));
        err
    }
}
