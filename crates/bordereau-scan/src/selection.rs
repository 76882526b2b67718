//! Files chosen for an upload, each with its declared document type.
//!
//! Order is significant: the n-th type sent to the server describes the n-th file,
//! so every operation here keeps files and types together in one entry.

use bordereau_core::models::{DocumentType, ScanFile};
use bordereau_core::validation::{check_batch, check_file, FileWarning};
use bordereau_core::{ScanError, ScanResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub file: ScanFile,
    pub doc_type: Option<DocumentType>,
}

#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    entries: Vec<SelectedFile>,
    bulk_type: Option<DocumentType>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append files. Each one starts with the current bulk type, if any.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = ScanFile>) {
        let doc_type = self.bulk_type;
        self.entries
            .extend(files.into_iter().map(|file| SelectedFile { file, doc_type }));
    }

    pub fn add(&mut self, file: ScanFile, doc_type: Option<DocumentType>) {
        self.entries.push(SelectedFile {
            file,
            doc_type: doc_type.or(self.bulk_type),
        });
    }

    /// Remove the file at `index`. Later files shift down and keep their own types.
    pub fn remove(&mut self, index: usize) -> ScanResult<SelectedFile> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    pub fn set_type(&mut self, index: usize, doc_type: Option<DocumentType>) -> ScanResult<()> {
        self.check_index(index)?;
        self.entries[index].doc_type = doc_type;
        Ok(())
    }

    /// Default type for files added from now on. Existing entries are untouched.
    pub fn set_bulk_type(&mut self, doc_type: Option<DocumentType>) {
        self.bulk_type = doc_type;
    }

    /// Set the bulk type and overwrite the type of every selected file with it.
    pub fn apply_bulk_type(&mut self, doc_type: DocumentType) {
        self.bulk_type = Some(doc_type);
        for entry in &mut self.entries {
            entry.doc_type = Some(doc_type);
        }
    }

    pub fn bulk_type(&self) -> Option<DocumentType> {
        self.bulk_type
    }

    pub fn entries(&self) -> &[SelectedFile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every file. The bulk type is kept for the next batch.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn types(&self) -> Vec<Option<DocumentType>> {
        self.entries.iter().map(|e| e.doc_type).collect()
    }

    /// Positions of files that still need a type.
    pub fn missing_types(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.doc_type.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Files paired with their types, in upload order.
    ///
    /// Fails without touching anything if the selection is empty or any file is untyped;
    /// the error names the first untyped file.
    pub fn typed_files(&self) -> ScanResult<Vec<(&ScanFile, DocumentType)>> {
        if self.entries.is_empty() {
            return Err(ScanError::EmptySelection);
        }
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| match entry.doc_type {
                Some(doc_type) => Ok((&entry.file, doc_type)),
                None => Err(ScanError::MissingDocumentType {
                    index,
                    file_name: entry.file.file_name.clone(),
                }),
            })
            .collect()
    }

    /// Advisory checks; the server remains the authority.
    pub fn warnings(&self) -> Vec<FileWarning> {
        let mut warnings: Vec<FileWarning> = self
            .entries
            .iter()
            .flat_map(|e| check_file(&e.file.file_name, e.file.size()))
            .collect();
        warnings.extend(check_batch(self.entries.len()));
        warnings
    }

    fn check_index(&self, index: usize) -> ScanResult<()> {
        if index >= self.entries.len() {
            return Err(ScanError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> ScanFile {
        ScanFile::new(name, b"%PDF".to_vec())
    }

    #[test]
    fn test_added_files_inherit_bulk_type() {
        let mut selection = FileSelection::new();
        selection.add_files([file("a.pdf")]);
        selection.set_bulk_type(Some(DocumentType::ContratAvenant));
        selection.add_files([file("b.pdf")]);

        assert_eq!(selection.types(), vec![None, Some(DocumentType::ContratAvenant)]);
        assert_eq!(selection.missing_types(), vec![0]);
    }

    #[test]
    fn test_apply_bulk_type_overwrites_every_entry() {
        let mut selection = FileSelection::new();
        selection.add(file("a.pdf"), Some(DocumentType::Adhesion));
        selection.add(file("b.pdf"), None);

        selection.apply_bulk_type(DocumentType::BulletinSoin);

        assert_eq!(
            selection.types(),
            vec![Some(DocumentType::BulletinSoin), Some(DocumentType::BulletinSoin)]
        );
    }

    #[test]
    fn test_typed_files_names_first_untyped_file() {
        let mut selection = FileSelection::new();
        selection.add(file("a.pdf"), Some(DocumentType::Reclamation));
        selection.add(file("b.pdf"), None);
        selection.add(file("c.pdf"), None);

        match selection.typed_files() {
            Err(ScanError::MissingDocumentType { index, file_name }) => {
                assert_eq!(index, 1);
                assert_eq!(file_name, "b.pdf");
            }
            other => panic!("expected MissingDocumentType, got {:?}", other),
        }
    }

    #[test]
    fn test_typed_files_rejects_empty_selection() {
        assert!(matches!(
            FileSelection::new().typed_files(),
            Err(ScanError::EmptySelection)
        ));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut selection = FileSelection::new();
        selection.add(file("a.pdf"), None);
        assert!(matches!(
            selection.set_type(3, Some(DocumentType::ContratAvenant)),
            Err(ScanError::IndexOutOfRange { index: 3, len: 1 })
        ));
        assert!(selection.remove(1).is_err());
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_warnings_flag_unsupported_extension() {
        let mut selection = FileSelection::new();
        selection.add(file("notes.docx"), None);
        selection.add(file("scan.pdf"), None);

        let warnings = selection.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            FileWarning::UnsupportedExtension { file_name } if file_name == "notes.docx"
        ));
    }
}
