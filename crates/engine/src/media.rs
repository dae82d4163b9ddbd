//! The media-store boundary.
//!
//! The workflow treats a stored asset as an opaque string reference.
//! [`LocalMediaStore`] is the bundled implementation: content-addressed
//! files under a base directory, so re-uploading identical bytes yields
//! the same reference.

use std::path::PathBuf;

use async_trait::async_trait;

use courseflow_core::hashing::sha256_hex;

/// What kind of asset is being stored. Decides the subdirectory only; the
/// workflow never inspects media contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Subdirectory for this kind of asset.
    pub fn subdir(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }
}

/// A failure while persisting an upload.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores uploaded bytes and returns a stable, opaque reference.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(&self, data: &[u8], kind: MediaKind) -> Result<String, MediaError>;
}

/// [`MediaStore`] over a local directory tree.
///
/// References have the shape `<subdir>/<sha256-hex>`, relative to the base
/// directory.
pub struct LocalMediaStore {
    base_dir: PathBuf,
}

impl LocalMediaStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, data: &[u8], kind: MediaKind) -> Result<String, MediaError> {
        let name = sha256_hex(data);
        let dir = self.base_dir.join(kind.subdir());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), data).await?;
        Ok(format!("{}/{}", kind.subdir(), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_bytes_under_kind_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        let media_ref = store.store(b"poster bytes", MediaKind::Image).await.unwrap();
        assert!(media_ref.starts_with("images/"));

        let on_disk = tokio::fs::read(dir.path().join(&media_ref)).await.unwrap();
        assert_eq!(on_disk, b"poster bytes");
    }

    #[tokio::test]
    async fn identical_bytes_yield_identical_references() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        let a = store.store(b"same", MediaKind::Video).await.unwrap();
        let b = store.store(b"same", MediaKind::Video).await.unwrap();
        assert_eq!(a, b);

        let c = store.store(b"different", MediaKind::Video).await.unwrap();
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn image_and_video_namespaces_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        let image = store.store(b"same", MediaKind::Image).await.unwrap();
        let video = store.store(b"same", MediaKind::Video).await.unwrap();
        assert_ne!(image, video);
    }
}
