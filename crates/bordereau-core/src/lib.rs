//! Bordereau Core Library
//!
//! This crate provides the domain models, error types, configuration and file
//! validation shared by the API client, the scan workflow and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{extract_server_message, ErrorMetadata, LogLevel, ScanError, ScanResult};
pub use models::{
    Bordereau, BordereauDocumentStatus, BordereauStatus, Client, Document, DocumentStatus,
    DocumentType, ScanFile, UploadTarget,
};
