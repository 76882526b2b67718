//! Error types module
//!
//! All failures of the scan client are unified under [`ScanError`]. Variants fall in
//! three groups:
//!
//! - local validation errors, raised before any request is sent;
//! - server errors, carrying the HTTP status and the message extracted from the
//!   server's JSON payload when present;
//! - transport and decoding errors.
//!
//! [`ErrorMetadata`] describes how each error should be presented to an operator.

use std::io;

use crate::constants::GENERIC_FAILURE_MESSAGE;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like transient network failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error presentation.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "MISSING_DOCUMENT_TYPE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the same action can be retried as is)
    fn is_recoverable(&self) -> bool;

    /// Whether the error was raised locally, without contacting the server
    fn is_local(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Operator-facing message
    fn user_message(&self) -> String;
}

pub type ScanResult<T> = Result<T, ScanError>;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("No files selected")]
    EmptySelection,

    #[error("File #{} ({file_name}) has no document type", index + 1)]
    MissingDocumentType { index: usize, file_name: String },

    #[error("Select a document type first")]
    DocumentTypeRequired,

    #[error("A cancellation reason is required")]
    MissingCancelReason,

    #[error("No bordereau selected")]
    NoBordereauSelected,

    #[error("Cannot {action} during the {step} step")]
    InvalidStep { action: &'static str, step: String },

    #[error("Bordereau {bordereau_id} cannot receive documents (status {status})")]
    InvalidUploadTarget {
        bordereau_id: String,
        status: String,
    },

    #[error("No changes to submit")]
    NothingToModify,

    #[error("No file at position {index} (selection has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API request failed with status {status}: {body}")]
    Api {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Operation rejected by server: {0}")]
    Rejected(String),

    #[error("Failed to send request: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        ScanError::Decode(err.to_string())
    }
}

impl ScanError {
    /// Build an API error from a non-success status and the raw response body.
    pub fn from_status(status: u16, body: String) -> Self {
        ScanError::Api {
            status,
            message: extract_server_message(&body),
            body,
        }
    }

    /// Server message, when the failure came with one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ScanError::Api { message, .. } => message.as_deref(),
            ScanError::Rejected(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// Extract a human-readable message from an error payload.
///
/// Accepts `{"message": "..."}`, `{"message": ["...", "..."]}` (joined with `, `)
/// and `{"error": "..."}`. Anything else yields `None`.
pub fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = match value.get("message") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    };
    message
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
}

/// Static metadata for each variant: (error_code, recoverable, local, log_level).
fn scan_error_static_metadata(err: &ScanError) -> (&'static str, bool, bool, LogLevel) {
    match err {
        ScanError::EmptySelection => ("EMPTY_SELECTION", false, true, LogLevel::Debug),
        ScanError::MissingDocumentType { .. } => {
            ("MISSING_DOCUMENT_TYPE", false, true, LogLevel::Debug)
        }
        ScanError::DocumentTypeRequired => {
            ("DOCUMENT_TYPE_REQUIRED", false, true, LogLevel::Debug)
        }
        ScanError::MissingCancelReason => ("MISSING_CANCEL_REASON", false, true, LogLevel::Debug),
        ScanError::NoBordereauSelected => ("NO_BORDEREAU_SELECTED", false, true, LogLevel::Debug),
        ScanError::InvalidStep { .. } => ("INVALID_STEP", false, true, LogLevel::Debug),
        ScanError::InvalidUploadTarget { .. } => {
            ("INVALID_UPLOAD_TARGET", false, true, LogLevel::Warn)
        }
        ScanError::NothingToModify => ("NOTHING_TO_MODIFY", false, true, LogLevel::Debug),
        ScanError::IndexOutOfRange { .. } => ("INDEX_OUT_OF_RANGE", false, true, LogLevel::Debug),
        ScanError::InvalidInput(_) => ("INVALID_INPUT", false, true, LogLevel::Debug),
        ScanError::Api { status, .. } if *status >= 500 => {
            ("SERVER_ERROR", true, false, LogLevel::Error)
        }
        ScanError::Api { .. } => ("REQUEST_REJECTED", false, false, LogLevel::Warn),
        ScanError::Rejected(_) => ("OPERATION_REJECTED", false, false, LogLevel::Warn),
        ScanError::Transport(_) => ("NETWORK_ERROR", true, false, LogLevel::Warn),
        ScanError::Decode(_) => ("INVALID_RESPONSE", false, false, LogLevel::Error),
        ScanError::Config(_) => ("CONFIGURATION_ERROR", false, true, LogLevel::Error),
        ScanError::Io(_) => ("IO_ERROR", false, true, LogLevel::Error),
    }
}

impl ErrorMetadata for ScanError {
    fn error_code(&self) -> &'static str {
        scan_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        scan_error_static_metadata(self).1
    }

    fn is_local(&self) -> bool {
        scan_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        scan_error_static_metadata(self).3
    }

    fn user_message(&self) -> String {
        match self {
            ScanError::Api { message, .. } => message
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            ScanError::Rejected(msg) if !msg.trim().is_empty() => msg.clone(),
            ScanError::Rejected(_) | ScanError::Transport(_) | ScanError::Decode(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}
