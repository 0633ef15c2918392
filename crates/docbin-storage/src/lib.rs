//! Storage backend abstraction for `docbin`.
//!
//! This crate defines the [`StorageBackend`] trait, a plain "bytes at a key"
//! capability that knows nothing about documents, credentials, compression,
//! or encryption. The document store in `docbin-core` owns the mapping from
//! document names to keys and hands this layer fully encoded envelopes.
//!
//! Two implementations are provided:
//!
//! - [`FilesystemBackend`]: production default, one file per document
//! - [`MemoryBackend`]: in-memory, for tests and throwaway deployments

mod error;
mod filesystem;
mod memory;

pub use error::StorageError;
pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;

/// A pluggable byte storage backend.
///
/// Keys are flat names (document names), never paths. Values are opaque byte
/// arrays. There is deliberately no listing operation: every caller addresses
/// storage by exact key.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a value, overwriting any existing value.
    ///
    /// A concurrent reader sees either the old value or the new one, never a
    /// partially written value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Deleting a non-existent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the underlying backend fails.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`. Backends may override this with a cheaper check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}
