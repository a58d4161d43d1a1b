//! Document handles: the files a user picked or dropped.
//!
//! The core treats a file as an opaque named byte buffer. Hosts that already
//! hold bytes (drag-and-drop, an upload widget) use [`DocumentFile::new`];
//! the CLI reads from disk with [`DocumentFile::from_path`].

use crate::error::DocGeniusError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A single selected document.
///
/// Contents are behind an `Arc` so a descriptor can be rebuilt for every
/// submission without copying file bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl DocumentFile {
    /// Wrap in-memory bytes. The content type is guessed from the name.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let content_type = guess_content_type(&name);
        Self {
            name,
            content_type,
            bytes: Arc::from(bytes.into()),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Read a local file, mapping missing/unreadable files to typed errors.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DocGeniusError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DocGeniusError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => DocGeniusError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DocGeniusError::Internal(format!("Failed to read {}: {e}", path.display())),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        debug!("Loaded document {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Load several paths in order, stopping at the first failure.
pub async fn load_all(paths: &[PathBuf]) -> Result<Vec<DocumentFile>, DocGeniusError> {
    let mut files = Vec::with_capacity(paths.len());
    for p in paths {
        files.push(DocumentFile::from_path(p).await?);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn content_type_is_guessed_from_extension() {
        let f = DocumentFile::new("notes.txt", b"hello".to_vec());
        assert_eq!(f.content_type(), "text/plain");
        let f = DocumentFile::new("blob", b"\x00".to_vec());
        assert_eq!(f.content_type(), "application/octet-stream");
    }

    #[test]
    fn debug_does_not_dump_bytes() {
        let f = DocumentFile::new("a.md", vec![b'x'; 4096]);
        let dbg = format!("{f:?}");
        assert!(dbg.contains("len: 4096"));
        assert!(dbg.len() < 200);
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let mut tmp = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        tmp.write_all(b"# Title\n").unwrap();
        let f = DocumentFile::from_path(tmp.path()).await.unwrap();
        assert!(f.name().ends_with(".md"));
        assert_eq!(f.bytes(), b"# Title\n");
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = DocumentFile::from_path("/definitely/not/here.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, DocGeniusError::FileNotFound { .. }));
    }
}
