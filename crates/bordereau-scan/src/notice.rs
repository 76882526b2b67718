//! User-facing notifications produced by workflow actions.
//!
//! Actions return `Result`s; the notice is the displayable summary that a front-end
//! (the CLI, a TUI) renders. Server wording is shown when the server supplied one.

use bordereau_core::{ErrorMetadata, LogLevel, ScanError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Local validation failures are warnings; anything the server refused is an error.
    pub fn from_error(err: &ScanError) -> Self {
        let level = if err.is_local() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        Self {
            level,
            message: err.user_message(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Log a failed action at the error's level and build its notice.
pub(crate) fn report_failure(action: &'static str, err: &ScanError) -> Notice {
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(action, error_code = err.error_code(), error = %err, "Action refused")
        }
        LogLevel::Warn => {
            tracing::warn!(action, error_code = err.error_code(), error = %err, "Action failed")
        }
        LogLevel::Error => {
            tracing::error!(action, error_code = err.error_code(), error = %err, "Action failed")
        }
    }
    Notice::from_error(err)
}
