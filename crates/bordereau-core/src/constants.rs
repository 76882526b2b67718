//! Shared constants for the scan client.

/// Message shown when a failed request carries no usable server message.
pub const GENERIC_FAILURE_MESSAGE: &str = "The request failed. Please try again.";

/// Default refresh period of the manual scan queue.
pub const DEFAULT_QUEUE_POLL_INTERVAL_SECS: u64 = 30;

/// Default refresh period of the rejected (returned to scan) list.
pub const DEFAULT_REJECTED_POLL_INTERVAL_SECS: u64 = 10;

/// Default HTTP request timeout. Uploads of large batches share this budget.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Extensions offered by the file picker.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "tiff", "tif"];

/// Advisory per-file size limit (5 GB).
pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Advisory batch size limit.
pub const MAX_FILES_PER_BATCH: usize = 1000;
