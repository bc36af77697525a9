//! Content-addressed object storage
//!
//! Objects live in named buckets and are keyed by the SHA-256 hash of their
//! content. Within a bucket, files use a two-level directory layout.
//!
//! Example: hash "abcd1234..." in bucket "moments" is stored at
//! "moments/ab/cd/abcd1234..."

use crate::error::{AppError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root directory if needed
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Object store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Write an object, returning its content hash
    pub async fn put(&self, bucket: &str, data: &[u8]) -> Result<String> {
        validate_bucket(bucket)?;

        let hash = calculate_hash(data);
        let path = self.object_path(bucket, &hash)?;

        if fs::try_exists(&path).await? {
            tracing::debug!("Object already exists: {}/{}", bucket, hash);
            return Ok(hash);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a temp file first so readers never see a partial object
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(temp_path, &path).await?;

        tracing::debug!("Wrote object: {}/{} ({} bytes)", bucket, hash, data.len());

        Ok(hash)
    }

    /// Relative key of an object, as used in public URLs
    pub fn key(bucket: &str, hash: &str) -> String {
        format!("{}/{}/{}/{}", bucket, &hash[0..2], &hash[2..4], hash)
    }

    fn object_path(&self, bucket: &str, hash: &str) -> Result<PathBuf> {
        validate_bucket(bucket)?;
        if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::BlobStore(format!("Invalid object hash: {}", hash)));
        }
        Ok(self.root.join(Self::key(bucket, hash)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn validate_bucket(bucket: &str) -> Result<()> {
    let valid = !bucket.is_empty()
        && bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(AppError::BlobStore(format!("Invalid bucket name: {}", bucket)))
    }
}

fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (ObjectStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = ObjectStore::new(temp_dir.path().join("objects"));
        store.initialize().await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_writes_content() {
        let (store, _temp) = create_test_store().await;

        let hash = store.put("moments", b"photo bytes").await.unwrap();
        let path = store.root().join(ObjectStore::key("moments", &hash));

        assert_eq!(std::fs::read(path).unwrap(), b"photo bytes");
    }

    #[tokio::test]
    async fn test_same_content_same_hash() {
        let (store, _temp) = create_test_store().await;

        let first = store.put("voice-notes", b"hello").await.unwrap();
        let second = store.put("voice-notes", b"hello").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_buckets_are_separate() {
        let (store, _temp) = create_test_store().await;

        let hash = store.put("moments", b"data").await.unwrap();

        assert!(store.root().join(ObjectStore::key("moments", &hash)).exists());
        assert!(!store.root().join(ObjectStore::key("media", &hash)).exists());
    }

    #[tokio::test]
    async fn test_directory_structure() {
        let (store, _temp) = create_test_store().await;

        let hash = store.put("moments", b"layout").await.unwrap();
        let path = store.root().join(ObjectStore::key("moments", &hash));
        assert!(path.exists());

        let parent = path.parent().unwrap();
        let grandparent = parent.parent().unwrap();
        assert_eq!(parent.file_name().unwrap(), &hash[2..4]);
        assert_eq!(grandparent.file_name().unwrap(), &hash[0..2]);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (store, _temp) = create_test_store().await;

        assert!(store.put("../etc", b"x").await.is_err());
        assert!(store.put("Moments", b"x").await.is_err());
    }
}
