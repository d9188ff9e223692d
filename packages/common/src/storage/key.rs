use std::fmt;

use super::error::StorageError;

/// An opaque, randomly assigned artifact identifier.
///
/// Keys are UUIDv4 values rendered as 32 lowercase hex characters. They are
/// assigned by the store at write time and carry no information about the
/// artifact's content, so deleting one artifact can never affect another.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageKey(uuid::Uuid);

impl StorageKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse a key previously produced by [`StorageKey::to_string`].
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if s.len() != 32 {
            return Err(StorageError::InvalidKey(format!(
                "expected 32 hex characters, got {}",
                s.len()
            )));
        }
        let uuid = uuid::Uuid::try_parse(s)
            .map_err(|e| StorageError::InvalidKey(format!("invalid key: {e}")))?;
        Ok(Self(uuid))
    }

    /// Return the first 2 hex characters (shard prefix for filesystem layout).
    pub fn shard_prefix(&self) -> String {
        self.0.as_simple().to_string()[..2].to_string()
    }

    /// Return the remaining 30 hex characters (filename within shard).
    pub fn shard_suffix(&self) -> String {
        self.0.as_simple().to_string()[2..].to_string()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", self.0.as_simple())
    }
}
