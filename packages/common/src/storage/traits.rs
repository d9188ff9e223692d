use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::key::StorageKey;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Key-addressed durable artifact storage.
///
/// Every successful write is assigned a fresh [`StorageKey`]; the caller is
/// responsible for recording the key in whatever metadata references the
/// artifact. Writes are durable once `put`/`put_stream` returns.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store bytes and return the assigned key.
    async fn put(&self, data: &[u8]) -> Result<StorageKey, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(reader).await
    }

    /// Store data from an async reader and return the assigned key.
    async fn put_stream(&self, reader: BoxReader) -> Result<StorageKey, StorageError>;

    /// Retrieve all bytes of an artifact.
    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(key).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve an artifact as a streaming async reader.
    async fn get_stream(&self, key: &StorageKey) -> Result<BoxReader, StorageError>;

    /// Check whether an artifact exists.
    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError>;

    /// Delete an artifact.
    ///
    /// Idempotent: returns `true` if the artifact was deleted, `false` if it
    /// did not exist.
    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError>;

    /// Get the size of an artifact in bytes.
    async fn size(&self, key: &StorageKey) -> Result<u64, StorageError>;
}
