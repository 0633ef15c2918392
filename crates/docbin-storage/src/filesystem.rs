//! Filesystem storage backend, the production default.
//!
//! Every key maps to exactly one file directly under the root directory.
//! Writes land in a hidden temporary file next to the target and are then
//! renamed over it, so readers never observe a half-written value. Keys are
//! restricted to flat file names; anything that could escape the root is
//! rejected with [`StorageError::InvalidKey`].
//!
//! Temporary files orphaned by a crash between write and rename are swept
//! when the directory is opened. Keys never start with `.`, so hidden `.tmp`
//! files in the root always belong to the backend.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{StorageBackend, StorageError};

/// Monotonic suffix for temporary file names within this process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A storage backend that keeps one file per key under a root directory.
///
/// # Examples
///
/// ```no_run
/// # use docbin_storage::FilesystemBackend;
/// let backend = FilesystemBackend::open("/var/lib/docbin/documents").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created or
    /// the path exists but is not a directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| StorageError::Open {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

        if !root.is_dir() {
            return Err(StorageError::Open {
                path: root.display().to_string(),
                reason: "not a directory".to_owned(),
            });
        }

        sweep_temp_files(root);

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Return the root directory of this backend.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let invalid = |reason: &str| StorageError::InvalidKey {
            key: key.to_owned(),
            reason: reason.to_owned(),
        };

        if key.is_empty() {
            return Err(invalid("key must not be empty"));
        }
        if key.starts_with('.') {
            return Err(invalid("key must not start with '.'"));
        }
        if key.contains(['/', '\\', '\0']) {
            return Err(invalid("key must not contain path separators or NUL"));
        }

        Ok(self.root.join(key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{key}.{}.{seq}.tmp", std::process::id()))
    }
}

fn is_temp_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

/// Best-effort removal of leftover temporary files under `root`.
fn sweep_temp_files(root: &Path) {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                path = %root.display(),
                error = %e,
                "failed to scan for temporary files"
            );
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        if !name.to_str().is_some_and(is_temp_file) {
            continue;
        }
        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "removed stale temporary file"),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to remove stale temporary file"
            ),
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for FilesystemBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.key_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        let temp = self.temp_path(key);
        let write_err = |e: std::io::Error| StorageError::Write {
            key: key.to_owned(),
            reason: e.to_string(),
        };

        tokio::fs::write(&temp, value).await.map_err(write_err)?;

        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                tracing::warn!(
                    path = %temp.display(),
                    error = %cleanup,
                    "failed to remove temporary file after rename failure"
                );
            }
            return Err(write_err(e));
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Delete {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.key_path(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::Read {
                key: key.to_owned(),
                reason: e.to_string(),
            })
    }
}
