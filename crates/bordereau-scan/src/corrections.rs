//! Bordereaux returned to scan by a team lead, and the fixes applied to them.
//!
//! The rejected list is read in two steps: one filtered list request, then one detail
//! request per bordereau (run concurrently) for its documents and client. A failed
//! detail request only degrades that entry to an empty document list.
//!
//! Local state is never edited optimistically. After a correction the affected
//! bordereau is refetched, and after completion the whole list is reloaded.

use crate::backend::{ensure_ack, ScanBackend};
use crate::notice::{report_failure, Notice};
use crate::poller::PollSource;
use crate::query::{QueryClient, QueryKey};
use crate::Callback;
use async_trait::async_trait;
use bordereau_core::models::{Bordereau, DocumentType, ModifyBordereauRequest, ScanFile};
use bordereau_core::{ErrorMetadata, ScanError, ScanResult};
use futures::future::join_all;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBordereau {
    pub bordereau: Bordereau,
    /// Set when the detail request failed and `bordereau.documents` is a placeholder.
    pub detail_error: Option<String>,
}

impl RejectedBordereau {
    pub fn id(&self) -> &str {
        &self.bordereau.id
    }

    pub fn is_complete(&self) -> bool {
        self.detail_error.is_none()
    }
}

/// Fetch rejected bordereaux with their documents and client.
pub async fn load_rejected<B: ScanBackend + ?Sized>(
    backend: &B,
) -> ScanResult<Vec<RejectedBordereau>> {
    let listed: Vec<Bordereau> = backend
        .rejected_bordereaux()
        .await?
        .into_iter()
        .filter(|b| {
            let keep = b.is_returned_to_scan();
            if !keep {
                tracing::debug!(bordereau_id = %b.id, status = %b.status, "Ignoring bordereau not returned to scan");
            }
            keep
        })
        .collect();

    let details = join_all(listed.iter().map(|b| backend.bordereau_detail(&b.id))).await;

    Ok(listed
        .into_iter()
        .zip(details)
        .map(|(summary, detail)| merge_detail(summary, detail))
        .collect())
}

fn merge_detail(summary: Bordereau, detail: ScanResult<Bordereau>) -> RejectedBordereau {
    match detail {
        Ok(full) => RejectedBordereau {
            bordereau: Bordereau {
                documents: full.documents,
                client: full.client.or(summary.client),
                ..summary
            },
            detail_error: None,
        },
        Err(e) => {
            tracing::warn!(
                bordereau_id = %summary.id,
                error_code = e.error_code(),
                error = %e,
                "Failed to load bordereau details"
            );
            RejectedBordereau {
                bordereau: Bordereau {
                    documents: Vec::new(),
                    client: None,
                    ..summary
                },
                detail_error: Some(e.user_message()),
            }
        }
    }
}

/// Fields to send for a modification: only those that differ from `original`.
///
/// A blank reference is an error; a blank or absent client leaves the client as is.
pub fn diff_changes(
    original: &Bordereau,
    reference: Option<&str>,
    client_id: Option<&str>,
) -> ScanResult<ModifyBordereauRequest> {
    let mut changes = ModifyBordereauRequest::default();

    if let Some(reference) = reference.map(str::trim) {
        if reference.is_empty() {
            return Err(ScanError::InvalidInput(
                "Reference cannot be empty".to_string(),
            ));
        }
        if reference != original.reference {
            changes.reference = Some(reference.to_string());
        }
    }

    if let Some(client_id) = client_id.map(str::trim).filter(|c| !c.is_empty()) {
        let current = original
            .client_id
            .as_deref()
            .or(original.client.as_ref().map(|c| c.id.as_str()));
        if current != Some(client_id) {
            changes.client_id = Some(client_id.to_string());
        }
    }

    if changes.is_empty() {
        return Err(ScanError::NothingToModify);
    }
    Ok(changes)
}

/// Rejected bordereaux as a [`PollSource`].
pub struct RejectedSource<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> RejectedSource<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: ScanBackend + ?Sized + 'static> PollSource for RejectedSource<B> {
    type Output = Vec<RejectedBordereau>;

    fn key(&self) -> QueryKey {
        QueryKey::RejectedBordereaux
    }

    async fn fetch(&self) -> ScanResult<Vec<RejectedBordereau>> {
        load_rejected(self.backend.as_ref()).await
    }
}

pub struct CorrectionDesk<B: ?Sized> {
    backend: Arc<B>,
    queries: QueryClient,
    rejected: Vec<RejectedBordereau>,
    missing_type: Option<DocumentType>,
    on_complete: Option<Callback<str>>,
    notice: Option<Notice>,
}

impl<B: ScanBackend + ?Sized> CorrectionDesk<B> {
    pub fn new(backend: Arc<B>, queries: QueryClient) -> Self {
        Self {
            backend,
            queries,
            rejected: Vec::new(),
            missing_type: None,
            on_complete: None,
            notice: None,
        }
    }

    /// Run `callback` with the bordereau id after corrections are confirmed complete.
    pub fn on_complete(mut self, callback: Callback<str>) -> Self {
        self.on_complete = Some(callback);
        self
    }

    pub fn rejected(&self) -> &[RejectedBordereau] {
        &self.rejected
    }

    pub fn get(&self, bordereau_id: &str) -> Option<&RejectedBordereau> {
        self.rejected.iter().find(|r| r.id() == bordereau_id)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Type used by the next [`Self::add_missing_document`].
    pub fn select_missing_type(&mut self, doc_type: Option<DocumentType>) {
        self.missing_type = doc_type;
    }

    pub fn missing_type(&self) -> Option<DocumentType> {
        self.missing_type
    }

    /// Replace the local list with a fresh server read. On failure the list is kept.
    pub async fn reload(&mut self) -> ScanResult<&[RejectedBordereau]> {
        match load_rejected(self.backend.as_ref()).await {
            Ok(rejected) => {
                tracing::debug!(count = rejected.len(), "Rejected bordereaux loaded");
                self.rejected = rejected;
                Ok(&self.rejected)
            }
            Err(e) => Err(self.fail("reload", e)),
        }
    }

    #[tracing::instrument(skip(self, file), fields(file = %file.file_name))]
    pub async fn replace_document(
        &mut self,
        bordereau_id: &str,
        document_name: &str,
        file: &ScanFile,
    ) -> ScanResult<()> {
        let result = self
            .backend
            .replace_document(bordereau_id, document_name, file)
            .await
            .and_then(ensure_ack);
        match result {
            Ok(ack) => {
                tracing::info!("Document replaced");
                self.notice = Some(Notice::success(ack.message.unwrap_or_else(|| {
                    format!("{} replaced by {}", document_name, file.file_name)
                })));
                self.refresh_entry(bordereau_id).await;
                Ok(())
            }
            Err(e) => Err(self.fail("replace_document", e)),
        }
    }

    /// Add a missing document using the selected type. No type selected means no request.
    #[tracing::instrument(skip(self, file), fields(file = %file.file_name))]
    pub async fn add_missing_document(
        &mut self,
        bordereau_id: &str,
        file: &ScanFile,
    ) -> ScanResult<()> {
        let Some(doc_type) = self.missing_type else {
            return Err(self.fail("add_missing_document", ScanError::DocumentTypeRequired));
        };
        let result = self
            .backend
            .add_missing_document(bordereau_id, doc_type, file)
            .await
            .and_then(ensure_ack);
        match result {
            Ok(ack) => {
                tracing::info!(doc_type = %doc_type, "Missing document added");
                self.notice = Some(Notice::success(
                    ack.message
                        .unwrap_or_else(|| format!("{} added as {}", file.file_name, doc_type)),
                ));
                self.missing_type = None;
                self.refresh_entry(bordereau_id).await;
                Ok(())
            }
            Err(e) => Err(self.fail("add_missing_document", e)),
        }
    }

    /// Send only the fields that differ from the loaded snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn modify_bordereau(
        &mut self,
        bordereau_id: &str,
        reference: Option<&str>,
        client_id: Option<&str>,
    ) -> ScanResult<ModifyBordereauRequest> {
        let original = match self.get(bordereau_id) {
            Some(entry) => entry.bordereau.clone(),
            None => match self.backend.bordereau_detail(bordereau_id).await {
                Ok(full) => full,
                Err(e) => return Err(self.fail("modify_bordereau", e)),
            },
        };
        let changes = match diff_changes(&original, reference, client_id) {
            Ok(changes) => changes,
            Err(e) => return Err(self.fail("modify_bordereau", e)),
        };

        let result = self
            .backend
            .modify_bordereau(bordereau_id, &changes)
            .await
            .and_then(ensure_ack);
        match result {
            Ok(ack) => {
                tracing::info!(changes = ?changes, "Bordereau modified");
                self.notice = Some(Notice::success(
                    ack.message
                        .unwrap_or_else(|| "Bordereau updated".to_string()),
                ));
                self.refresh_entry(bordereau_id).await;
                Ok(changes)
            }
            Err(e) => Err(self.fail("modify_bordereau", e)),
        }
    }

    /// Finish the correction pass. The bordereau leaves the list only once a reload
    /// confirms it.
    #[tracing::instrument(skip(self))]
    pub async fn complete_corrections(&mut self, bordereau_id: &str) -> ScanResult<()> {
        let result = self
            .backend
            .complete_corrections(bordereau_id)
            .await
            .and_then(ensure_ack);
        match result {
            Ok(ack) => {
                tracing::info!("Corrections completed");
                self.notice = Some(Notice::success(
                    ack.message
                        .unwrap_or_else(|| "Corrections completed".to_string()),
                ));
                self.queries
                    .invalidate_all(&[QueryKey::RejectedBordereaux, QueryKey::ScanQueue]);
                match load_rejected(self.backend.as_ref()).await {
                    Ok(rejected) => self.rejected = rejected,
                    Err(e) => {
                        tracing::warn!(error = %e, "Reload after completion failed, list may be stale")
                    }
                }
                if let Some(callback) = &self.on_complete {
                    callback(bordereau_id);
                }
                Ok(())
            }
            Err(e) => Err(self.fail("complete_corrections", e)),
        }
    }

    /// Refetch one bordereau's details after a correction.
    async fn refresh_entry(&mut self, bordereau_id: &str) {
        self.queries.invalidate(QueryKey::RejectedBordereaux);
        let detail = self.backend.bordereau_detail(bordereau_id).await;
        let Some(index) = self.rejected.iter().position(|r| r.id() == bordereau_id) else {
            return;
        };
        match detail {
            Ok(full) => {
                self.rejected[index] = RejectedBordereau {
                    bordereau: full,
                    detail_error: None,
                };
            }
            Err(e) => {
                tracing::warn!(bordereau_id, error = %e, "Failed to refresh bordereau after correction");
            }
        }
    }

    fn fail(&mut self, action: &'static str, err: ScanError) -> ScanError {
        self.notice = Some(report_failure(action, &err));
        err
    }
}
