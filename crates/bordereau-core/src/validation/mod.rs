//! Validation modules

pub mod files;

pub use files::{check_batch, check_file, has_accepted_extension, FileWarning};
