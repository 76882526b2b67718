//! Builders for queue items, bordereaux and files.

use bordereau_core::models::{
    Bordereau, BordereauDocumentStatus, BordereauStatus, Client, Document, DocumentStatus,
    DocumentType, ScanFile, ScanQueueItem,
};

pub fn queue_item(id: &str) -> ScanQueueItem {
    ScanQueueItem {
        id: id.to_string(),
        reference: format!("BR-{}", id),
        client_name: Some("Client A".to_string()),
        date_reception: None,
        nombre_bs: 3,
        delai_reglement: Some(30),
        documents_count: 0,
        can_scan: true,
        priority: None,
    }
}

pub fn bordereau(id: &str, status: BordereauStatus) -> Bordereau {
    Bordereau {
        id: id.to_string(),
        reference: format!("BR-{}", id),
        client_id: Some("c1".to_string()),
        status,
        document_status: None,
        date_reception: None,
        documents: Vec::new(),
        client: None,
    }
}

/// A bordereau returned to scan, as listed (no documents, no client).
pub fn rejected(id: &str) -> Bordereau {
    Bordereau {
        document_status: Some(BordereauDocumentStatus::RetourScan),
        ..bordereau(id, BordereauStatus::ScanEnCours)
    }
}

/// The same bordereau with its relations loaded.
pub fn rejected_detail(id: &str, document_names: &[&str]) -> Bordereau {
    Bordereau {
        documents: document_names
            .iter()
            .enumerate()
            .map(|(i, name)| Document {
                id: format!("{}-d{}", id, i + 1),
                name: name.to_string(),
                doc_type: Some(DocumentType::BulletinSoin),
                status: Some(DocumentStatus::Uploaded),
                uploaded_at: None,
            })
            .collect(),
        client: Some(Client {
            id: "c1".to_string(),
            name: "Client A".to_string(),
        }),
        ..rejected(id)
    }
}

pub fn pdf(name: &str) -> ScanFile {
    ScanFile::new(name, b"%PDF-1.4 test".to_vec())
}
