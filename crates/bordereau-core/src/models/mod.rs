pub mod bordereau;
pub mod document;
pub mod file;
pub mod scan;

pub use bordereau::{Bordereau, BordereauDocumentStatus, BordereauStatus, Client, UploadTarget};
pub use document::{Document, DocumentStatus, DocumentType};
pub use file::ScanFile;
pub use scan::{
    DocumentTypeCounts, DocumentTypeStats, ModifyBordereauRequest, MultiScanCapability,
    MutationResponse, ScanPriority, ScanQueueItem, ScanStatistics, StartScanResponse,
    UploadFileError, UploadResponse, UploadedDocument,
};
