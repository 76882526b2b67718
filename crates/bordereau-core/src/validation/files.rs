//! File validation module
//!
//! Advisory checks applied to files before they are sent for scanning:
//! - Extension must be one the scan picker accepts
//! - Per-file size limit (5 GB)
//! - Batch size limit (1000 files)
//!
//! None of these checks block an upload; the server remains the authority and
//! reports per-file rejections in its upload response.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use crate::constants::{ACCEPTED_EXTENSIONS, MAX_FILES_PER_BATCH, MAX_FILE_SIZE_BYTES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileWarning {
    UnsupportedExtension { file_name: String },
    TooLarge { file_name: String, size: u64 },
    TooManyFiles { count: usize },
}

impl Display for FileWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileWarning::UnsupportedExtension { file_name } => write!(
                f,
                "{} is not one of the accepted formats ({})",
                file_name,
                ACCEPTED_EXTENSIONS.join(", ")
            ),
            FileWarning::TooLarge { file_name, size } => write!(
                f,
                "{} is {} bytes, above the {} bytes limit",
                file_name, size, MAX_FILE_SIZE_BYTES
            ),
            FileWarning::TooManyFiles { count } => write!(
                f,
                "{} files selected, above the {} files per batch limit",
                count, MAX_FILES_PER_BATCH
            ),
        }
    }
}

/// Case-insensitive extension check against [`ACCEPTED_EXTENSIONS`].
pub fn has_accepted_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.iter().any(|accepted| *accepted == ext)
        })
        .unwrap_or(false)
}

/// Check a single file.
pub fn check_file(file_name: &str, size: u64) -> Vec<FileWarning> {
    let mut warnings = Vec::new();
    if !has_accepted_extension(file_name) {
        warnings.push(FileWarning::UnsupportedExtension {
            file_name: file_name.to_string(),
        });
    }
    if size > MAX_FILE_SIZE_BYTES {
        warnings.push(FileWarning::TooLarge {
            file_name: file_name.to_string(),
            size,
        });
    }
    warnings
}

/// Check the number of files in one batch.
pub fn check_batch(count: usize) -> Option<FileWarning> {
    (count > MAX_FILES_PER_BATCH).then_some(FileWarning::TooManyFiles { count })
}
