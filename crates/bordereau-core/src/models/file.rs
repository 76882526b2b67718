use bytes::Bytes;
use std::fmt;
use std::path::Path;

use crate::error::{ScanError, ScanResult};

/// A local file selected for scanning.
///
/// Content is held as [`Bytes`] so a failed upload can be retried from the same
/// selection without copying or re-reading the file.
#[derive(Clone, PartialEq, Eq)]
pub struct ScanFile {
    pub file_name: String,
    pub content: Bytes,
}

impl ScanFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk. The upload name is the path's final component.
    pub fn from_path(path: &Path) -> ScanResult<Self> {
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ScanError::InvalidInput(format!("Invalid file name: {}", path.display())))?
            .to_string();
        Ok(Self::new(file_name, content))
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// MIME type derived from the extension; the server only accepts PDF, JPEG, PNG and TIFF.
    pub fn content_type(&self) -> &'static str {
        let ext = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => "application/pdf",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("tif") | Some("tiff") => "image/tiff",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Debug for ScanFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanFile")
            .field("file_name", &self.file_name)
            .field("size", &self.content.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(ScanFile::new("a.PDF", vec![]).content_type(), "application/pdf");
        assert_eq!(ScanFile::new("a.jpeg", vec![]).content_type(), "image/jpeg");
        assert_eq!(ScanFile::new("a.tif", vec![]).content_type(), "image/tiff");
        assert_eq!(
            ScanFile::new("a.bin", vec![]).content_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_from_path_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bs_001.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.4").unwrap();

        let file = ScanFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, "bs_001.pdf");
        assert_eq!(file.size(), 8);
    }

    #[test]
    fn test_from_path_accepts_relative_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("inbox")).unwrap();
        std::fs::write(dir.path().join("bs_002.pdf"), b"%PDF").unwrap();

        let path = dir.path().join("inbox").join("..").join("bs_002.pdf");
        let file = ScanFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, "bs_002.pdf");
        assert_eq!(file.size(), 4);
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScanFile::from_path(&dir.path().join("absent.pdf")).unwrap_err();
        assert!(matches!(err, ScanError::Io(_)));
    }
}
