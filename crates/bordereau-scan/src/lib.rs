//! Manual scan workflow for bordereaux.
//!
//! - [`selection`]: ordered files, each paired with its declared document type
//! - [`upload`]: validation, endpoint selection and multipart upload
//! - [`session`]: the select → upload → validate lifecycle of one scan session
//! - [`corrections`]: bordereaux returned to scan by a team lead, and their fixes
//! - [`query`] and [`poller`]: cache invalidation and cancellable background refresh
//!
//! Every network call goes through the [`ScanBackend`] trait, implemented for
//! [`bordereau_api_client::ApiClient`].

pub mod backend;
pub mod corrections;
pub mod job;
pub mod notice;
pub mod poller;
pub mod query;
pub mod selection;
pub mod session;
pub mod upload;

use std::sync::Arc;

pub use backend::ScanBackend;
pub use corrections::{load_rejected, CorrectionDesk, RejectedBordereau, RejectedSource};
pub use job::{ScanJob, ScanJobKind};
pub use notice::{Notice, NoticeLevel};
pub use poller::{FrozenView, PollSource, Poller, Snapshot};
pub use query::{QueryClient, QueryKey};
pub use selection::{FileSelection, SelectedFile};
pub use session::{ScanQueueSource, ScanSession, ScanStep};
pub use upload::{DocumentUploader, UploadOutcome};

/// Caller-supplied hook run after a confirmed success.
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;
