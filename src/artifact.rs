//! Downloadable artifacts and their lifetime.
//!
//! A binary result is only useful once the user can save it. The
//! [`ArtifactStore`] writes each published artifact into a private temp
//! directory and hands back an [`ArtifactLink`]. Publishing a new artifact
//! revokes the previous link, and dropping the store removes the directory,
//! so repeated conversions never accumulate files.

use crate::error::DocGeniusError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, warn};

/// A binary output (converted file or batch archive).
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    file_name: String,
    bytes: Arc<[u8]>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Name as reported by the service (or the fallback).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Name safe to join onto a local directory.
    ///
    /// The service controls the Content-Disposition header, so any directory
    /// components are stripped.
    pub fn safe_file_name(&self) -> String {
        let candidate = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("")
            .trim();
        if candidate.is_empty() || candidate == "." || candidate == ".." {
            "download.bin".to_string()
        } else {
            candidate.to_string()
        }
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

    /// Write into `dir` under [`Self::safe_file_name`], returning the path.
    pub async fn save_to_dir(&self, dir: &Path) -> Result<PathBuf, DocGeniusError> {
        let path = dir.join(self.safe_file_name());
        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(|source| DocGeniusError::OutputWriteFailed {
                path: path.clone(),
                source,
            })?;
        debug!("Saved artifact to {}", path.display());
        Ok(path)
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Handle to a published artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLink {
    id: u64,
    path: PathBuf,
    file_name: String,
}

impl ArtifactLink {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Temp-directory-backed holder for the current downloadable artifact.
pub struct ArtifactStore {
    dir: TempDir,
    next_id: u64,
    current: Option<ArtifactLink>,
}

impl ArtifactStore {
    pub fn new() -> Result<Self, DocGeniusError> {
        let dir = TempDir::new().map_err(|e| DocGeniusError::Internal(e.to_string()))?;
        Ok(Self {
            dir,
            next_id: 0,
            current: None,
        })
    }

    /// Materialise `artifact`, revoking whatever was published before.
    pub async fn publish(&mut self, artifact: &Artifact) -> Result<ArtifactLink, DocGeniusError> {
        self.revoke_current().await;

        self.next_id += 1;
        // One sub-directory per link keeps the service-provided name intact.
        let slot = self.dir.path().join(self.next_id.to_string());
        tokio::fs::create_dir_all(&slot)
            .await
            .map_err(|source| DocGeniusError::OutputWriteFailed {
                path: slot.clone(),
                source,
            })?;
        let path = slot.join(artifact.safe_file_name());
        tokio::fs::write(&path, artifact.bytes())
            .await
            .map_err(|source| DocGeniusError::OutputWriteFailed {
                path: path.clone(),
                source,
            })?;

        let link = ArtifactLink {
            id: self.next_id,
            path,
            file_name: artifact.file_name().to_string(),
        };
        debug!("Published artifact #{} ({} bytes)", link.id, artifact.len());
        self.current = Some(link.clone());
        Ok(link)
    }

    pub fn current(&self) -> Option<&ArtifactLink> {
        self.current.as_ref()
    }

    /// Revoke the current link, if any. Returns whether something was removed.
    pub async fn revoke_current(&mut self) -> bool {
        let Some(link) = self.current.take() else {
            return false;
        };
        if let Some(slot) = link.path.parent() {
            if let Err(e) = tokio::fs::remove_dir_all(slot).await {
                warn!("Failed to revoke artifact #{}: {}", link.id, e);
            }
        }
        true
    }
}

impl fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("dir", &self.dir.path())
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_file_name_strips_directories() {
        assert_eq!(Artifact::new("../../etc/passwd", Vec::<u8>::new()).safe_file_name(), "passwd");
        assert_eq!(Artifact::new("a\\b\\out.pdf", Vec::<u8>::new()).safe_file_name(), "out.pdf");
        assert_eq!(Artifact::new("..", Vec::<u8>::new()).safe_file_name(), "download.bin");
        assert_eq!(Artifact::new("out.pdf", Vec::<u8>::new()).safe_file_name(), "out.pdf");
    }

    #[tokio::test]
    async fn publishing_revokes_previous_link() {
        let mut store = ArtifactStore::new().unwrap();
        let first = store
            .publish(&Artifact::new("a.pdf", b"one".to_vec()))
            .await
            .unwrap();
        assert!(first.path().exists());

        let second = store
            .publish(&Artifact::new("a.pdf", b"two".to_vec()))
            .await
            .unwrap();
        assert!(!first.path().exists(), "old link must be revoked");
        assert_eq!(std::fs::read(second.path()).unwrap(), b"two");
        assert_eq!(store.current(), Some(&second));
    }

    #[tokio::test]
    async fn drop_removes_everything() {
        let mut store = ArtifactStore::new().unwrap();
        let link = store
            .publish(&Artifact::new("x.zip", b"zip".to_vec()))
            .await
            .unwrap();
        let path = link.path().to_path_buf();
        drop(store);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn revoke_without_current_is_noop() {
        let mut store = ArtifactStore::new().unwrap();
        assert!(!store.revoke_current().await);
    }

    #[tokio::test]
    async fn revoke_removes_the_published_file() {
        let mut store = ArtifactStore::new().unwrap();
        let link = store
            .publish(&Artifact::new("r.csv", b"a,b".to_vec()))
            .await
            .unwrap();
        assert!(store.revoke_current().await);
        assert!(!link.path().exists());
        assert_eq!(store.current(), None);
    }

    #[test]
    fn save_to_dir_writes_sanitised_name() {
        let dir = tempfile::tempdir().unwrap();
        let art = Artifact::new("nested/report.zip", b"PK".to_vec());
        let path = tokio_test::block_on(art.save_to_dir(dir.path())).unwrap();
        assert_eq!(path, dir.path().join("report.zip"));
        assert_eq!(std::fs::read(path).unwrap(), b"PK");
    }
}
