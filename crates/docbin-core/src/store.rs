//! The document store.
//!
//! [`DocumentStore`] is the only component that touches the name → stored
//! envelope mapping. Every operation runs the same short pipeline:
//! validate → load → authorize → transform → persist. Any failure before the
//! final write leaves storage untouched, and the write itself replaces the
//! whole envelope at once.
//!
//! # Concurrency
//!
//! There is no locking. Two publishes racing for the same name can both pass
//! the existence check and the later write wins; an access racing a remove
//! can report not-found late. Operations on different names never interact.

use std::sync::Arc;

use docbin_storage::StorageBackend;
use tracing::{debug, info, warn};

use crate::codec::PayloadCodec;
use crate::config::DocumentConfig;
use crate::credential;
use crate::envelope::DocumentEnvelope;
use crate::error::{ConfigError, DocumentError};
use crate::identifier::{self, IdentifierGenerator};

/// Optional knobs for [`DocumentStore::publish`].
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Use this exact name instead of generating one.
    pub name: Option<String>,
    /// Generate a name of this length instead of the default.
    pub name_length: Option<usize>,
    /// Use this secret instead of generating one.
    pub secret: Option<String>,
    /// Protect (and encrypt) the document with this password.
    pub password: Option<String>,
    /// Seconds until the document expires; `0` or `None` means never.
    pub lifetime_secs: Option<u64>,
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// The document name.
    pub name: String,
    /// The write secret. Returned once; only its digest is stored.
    pub secret: String,
    /// Expiry as Unix milliseconds, if the document expires.
    pub expires_at: Option<i64>,
}

/// A decoded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The document name.
    pub name: String,
    /// The original payload bytes.
    pub data: Vec<u8>,
    /// Expiry as Unix milliseconds, if the document expires.
    pub expires_at: Option<i64>,
}

/// Publishes, reads, edits, and removes documents on top of a storage backend.
pub struct DocumentStore {
    storage: Arc<dyn StorageBackend>,
    config: DocumentConfig,
    names: IdentifierGenerator,
    codec: PayloadCodec,
}

impl DocumentStore {
    /// Create a store over `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` does not validate.
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        config: DocumentConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let names = IdentifierGenerator::new(
            Arc::clone(&storage),
            config.alphabet_size,
            config.max_name_attempts,
        );
        let codec = PayloadCodec::new(config.compression_level, config.max_document_length);

        Ok(Self {
            storage,
            config,
            names,
            codec,
        })
    }

    /// The configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Store a new document and return its name and write secret.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::InvalidLength`] for an empty or oversized payload,
    ///   or a custom secret or password outside its bounds.
    /// - [`DocumentError::InvalidInput`] for a malformed custom name,
    ///   an out-of-range name length, or control characters in credentials.
    /// - [`DocumentError::NameAlreadyExists`] if the custom name is taken.
    /// - Internal errors from name generation, the codec, or storage.
    pub async fn publish(
        &self,
        payload: &[u8],
        options: PublishOptions,
    ) -> Result<Published, DocumentError> {
        self.validate_payload(payload)?;

        let secret = match options.secret {
            Some(secret) => {
                validate_credential("secret", &secret, self.config.max_secret_length)?;
                secret
            }
            None => identifier::generate_secret(
                self.config.secret_chunk_count,
                self.config.secret_chunk_length,
            ),
        };

        let name = if let Some(name) = options.name {
            self.validate_name(&name)?;
            if self.exists(&name).await? {
                return Err(DocumentError::NameAlreadyExists { name });
            }
            name
        } else {
            let length = options
                .name_length
                .unwrap_or(self.config.default_name_length);
            self.validate_name_length(length)?;
            self.names.generate_unique_name(length).await?
        };

        if let Some(password) = &options.password {
            validate_credential("password", password, self.config.max_password_length)?;
        }

        let payload = self.codec.encode(payload, options.password.as_deref())?;

        let expires_at = match options.lifetime_secs {
            Some(secs) if secs > 0 => Some(expiry_from_now(secs)),
            _ => None,
        };

        let envelope = DocumentEnvelope {
            payload,
            secret_hash: credential::hash(&secret),
            password_hash: options.password.as_deref().map(credential::hash),
            expires_at,
        };
        self.persist(&name, &envelope).await?;

        info!(
            name = %name,
            protected = envelope.requires_password(),
            expires_at = ?expires_at,
            "document published"
        );

        Ok(Published {
            name,
            secret,
            expires_at,
        })
    }

    /// Read and decode a document.
    ///
    /// An empty `password` counts as no password.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::InvalidInput`] for a malformed name.
    /// - [`DocumentError::NotFound`] if the document is missing or expired.
    /// - [`DocumentError::PasswordNeeded`] / [`DocumentError::InvalidPassword`]
    ///   for protected documents.
    /// - Internal errors from storage, the envelope, or the codec.
    pub async fn access(
        &self,
        name: &str,
        password: Option<&str>,
    ) -> Result<Document, DocumentError> {
        self.validate_name(name)?;
        let envelope = self.load_live(name).await?.ok_or_else(|| not_found(name))?;
        let key = authorize_password(name, &envelope, password)?;

        let data = self.codec.decode(&envelope.payload, key)?;

        debug!(name = %name, "document accessed");

        Ok(Document {
            name: name.to_owned(),
            data,
            expires_at: envelope.expires_at,
        })
    }

    /// Replace a document's content, keeping its credentials and expiry.
    ///
    /// Protected documents also need their password, because the content
    /// key is derived from it and is not stored.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::InvalidInput`] for a malformed name.
    /// - [`DocumentError::NotFound`] if the document is missing or expired.
    /// - [`DocumentError::InvalidSecret`] if `secret` does not match.
    /// - [`DocumentError::PasswordNeeded`] / [`DocumentError::InvalidPassword`]
    ///   for protected documents.
    /// - [`DocumentError::InvalidLength`] for an empty or oversized payload.
    /// - Internal errors from storage, the envelope, or the codec.
    pub async fn edit(
        &self,
        name: &str,
        payload: &[u8],
        secret: &str,
        password: Option<&str>,
    ) -> Result<bool, DocumentError> {
        self.validate_name(name)?;
        let envelope = self.load_live(name).await?.ok_or_else(|| not_found(name))?;
        authorize_secret(name, &envelope, secret)?;
        let key = authorize_password(name, &envelope, password)?;
        self.validate_payload(payload)?;

        let updated = DocumentEnvelope {
            payload: self.codec.encode(payload, key)?,
            ..envelope
        };
        self.persist(name, &updated).await?;

        info!(name = %name, "document edited");
        Ok(true)
    }

    /// Delete a document.
    ///
    /// Returns `false` if the storage backend failed to delete the file.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::InvalidInput`] for a malformed name.
    /// - [`DocumentError::NotFound`] if the document is missing or expired.
    /// - [`DocumentError::InvalidSecret`] if `secret` does not match.
    /// - Internal errors from loading the envelope.
    pub async fn remove(&self, name: &str, secret: &str) -> Result<bool, DocumentError> {
        self.validate_name(name)?;
        let envelope = self.load_live(name).await?.ok_or_else(|| not_found(name))?;
        authorize_secret(name, &envelope, secret)?;

        match self.storage.delete(name).await {
            Ok(()) => {
                info!(name = %name, "document removed");
                Ok(true)
            }
            Err(e) => {
                warn!(name = %name, error = %e, "failed to remove document");
                Ok(false)
            }
        }
    }

    /// Whether a live (present and unexpired) document exists under `name`.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::InvalidInput`] for a malformed name.
    /// - Internal errors from storage or the envelope.
    pub async fn exists(&self, name: &str) -> Result<bool, DocumentError> {
        self.validate_name(name)?;
        Ok(self.load_live(name).await?.is_some())
    }

    /// Load an envelope, treating expired documents as absent and deleting
    /// them on the way.
    async fn load_live(&self, name: &str) -> Result<Option<DocumentEnvelope>, DocumentError> {
        let Some(bytes) = self.storage.get(name).await? else {
            return Ok(None);
        };
        let envelope = DocumentEnvelope::from_bytes(&bytes, self.config.max_envelope_length())?;

        if envelope.is_expired_at(now_millis()) {
            self.reclaim(name).await;
            return Ok(None);
        }
        Ok(Some(envelope))
    }

    async fn reclaim(&self, name: &str) {
        match self.storage.delete(name).await {
            Ok(()) => info!(name = %name, "expired document reclaimed"),
            Err(e) => warn!(name = %name, error = %e, "failed to reclaim expired document"),
        }
    }

    async fn persist(&self, name: &str, envelope: &DocumentEnvelope) -> Result<(), DocumentError> {
        let bytes = envelope.to_bytes(self.config.max_envelope_length())?;
        self.storage.put(name, &bytes).await?;
        Ok(())
    }

    fn validate_payload(&self, payload: &[u8]) -> Result<(), DocumentError> {
        let max = self.config.max_document_length;
        if payload.is_empty() || payload.len() > max {
            return Err(DocumentError::InvalidLength {
                field: "document",
                actual: payload.len(),
                min: 1,
                max,
            });
        }
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<(), DocumentError> {
        let (min, max) = (self.config.min_name_length, self.config.max_name_length);
        if identifier::is_valid_name(name, min, max) {
            Ok(())
        } else {
            Err(DocumentError::InvalidInput {
                reason: format!(
                    "document name must be {min} to {max} characters of [A-Za-z0-9_-]"
                ),
            })
        }
    }

    fn validate_name_length(&self, length: usize) -> Result<(), DocumentError> {
        let (min, max) = (self.config.min_name_length, self.config.max_name_length);
        if (min..=max).contains(&length) {
            Ok(())
        } else {
            Err(DocumentError::InvalidInput {
                reason: format!("document name length {length} is outside {min}..={max}"),
            })
        }
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn validate_credential(field: &'static str, value: &str, max: usize) -> Result<(), DocumentError> {
    if value.is_empty() || value.len() > max {
        return Err(DocumentError::InvalidLength {
            field,
            actual: value.len(),
            min: 1,
            max,
        });
    }
    if value.chars().any(char::is_control) {
        return Err(DocumentError::InvalidInput {
            reason: format!("{field} must not contain control characters"),
        });
    }
    Ok(())
}

fn authorize_secret(
    name: &str,
    envelope: &DocumentEnvelope,
    secret: &str,
) -> Result<(), DocumentError> {
    if credential::compare(secret, &envelope.secret_hash) {
        Ok(())
    } else {
        Err(DocumentError::InvalidSecret {
            name: name.to_owned(),
        })
    }
}

/// Check the password for protected documents and return the key material
/// the codec needs (`None` for unprotected documents).
fn authorize_password<'a>(
    name: &str,
    envelope: &DocumentEnvelope,
    password: Option<&'a str>,
) -> Result<Option<&'a str>, DocumentError> {
    let Some(password_hash) = &envelope.password_hash else {
        return Ok(None);
    };
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return Err(DocumentError::PasswordNeeded {
            name: name.to_owned(),
        });
    };
    if !credential::compare(password, password_hash) {
        return Err(DocumentError::InvalidPassword {
            name: name.to_owned(),
        });
    }
    Ok(Some(password))
}

fn not_found(name: &str) -> DocumentError {
    DocumentError::NotFound {
        name: name.to_owned(),
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn expiry_from_now(lifetime_secs: u64) -> i64 {
    let lifetime_ms = i64::try_from(lifetime_secs)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    now_millis().saturating_add(lifetime_ms)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use docbin_storage::{FilesystemBackend, MemoryBackend, StorageError};

    fn store_with(storage: Arc<dyn StorageBackend>) -> DocumentStore {
        DocumentStore::new(storage, DocumentConfig::default()).unwrap()
    }

    fn memory_store() -> (Arc<MemoryBackend>, DocumentStore) {
        let storage = Arc::new(MemoryBackend::new());
        let store = store_with(Arc::clone(&storage) as Arc<dyn StorageBackend>);
        (storage, store)
    }

    fn kind(result: Result<impl std::fmt::Debug, DocumentError>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    /// Storage whose deletes always fail.
    struct StuckDeletes(MemoryBackend);

    #[async_trait::async_trait]
    impl StorageBackend for StuckDeletes {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            self.0.get(key).await
        }
        async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
            self.0.put(key, value).await
        }
        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Delete {
                key: key.to_owned(),
                reason: "read-only filesystem".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn publish_defaults_then_access() {
        let (_, store) = memory_store();
        let published = store
            .publish(b"Hello, World!", PublishOptions::default())
            .await
            .unwrap();

        assert_eq!(published.name.len(), 8);
        assert!(identifier::is_valid_name(&published.name, 8, 8));
        assert_eq!(published.expires_at, None);

        let chunks: Vec<&str> = published.secret.split('-').collect();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len() == 5));

        let doc = store.access(&published.name, None).await.unwrap();
        assert_eq!(doc.name, published.name);
        assert_eq!(doc.data, b"Hello, World!");
    }

    #[tokio::test]
    async fn stored_envelope_never_holds_the_secret() {
        let (storage, store) = memory_store();
        let published = store
            .publish(b"find me in storage", PublishOptions::default())
            .await
            .unwrap();

        let raw = storage.get(&published.name).await.unwrap().unwrap();
        assert!(!raw
            .windows(published.secret.len())
            .any(|w| w == published.secret.as_bytes()));
    }

    #[tokio::test]
    async fn password_protected_access() {
        let (storage, store) = memory_store();
        let published = store
            .publish(
                b"for your eyes only",
                PublishOptions {
                    password: Some("p@ss".to_owned()),
                    ..PublishOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            kind(store.access(&published.name, None).await),
            ErrorKind::PasswordNeeded
        );
        assert_eq!(
            kind(store.access(&published.name, Some("")).await),
            ErrorKind::PasswordNeeded
        );
        assert_eq!(
            kind(store.access(&published.name, Some("wrong")).await),
            ErrorKind::InvalidPassword
        );

        let doc = store.access(&published.name, Some("p@ss")).await.unwrap();
        assert_eq!(doc.data, b"for your eyes only");

        let raw = storage.get(&published.name).await.unwrap().unwrap();
        let envelope = DocumentEnvelope::from_bytes(&raw, usize::MAX).unwrap();
        assert!(envelope.requires_password());
        assert!(!raw.windows(4).any(|w| w == b"p@ss"));
    }

    #[tokio::test]
    async fn password_is_ignored_for_public_documents() {
        let (_, store) = memory_store();
        let published = store
            .publish(b"public", PublishOptions::default())
            .await
            .unwrap();
        let doc = store.access(&published.name, Some("anything")).await.unwrap();
        assert_eq!(doc.data, b"public");
    }

    #[tokio::test]
    async fn edit_requires_correct_secret() {
        let (_, store) = memory_store();
        let published = store
            .publish(b"version one", PublishOptions::default())
            .await
            .unwrap();

        assert_eq!(
            kind(store.edit(&published.name, b"hijacked", "wrong-secret", None).await),
            ErrorKind::InvalidSecret
        );
        assert_eq!(
            store.access(&published.name, None).await.unwrap().data,
            b"version one"
        );

        let edited = store
            .edit(&published.name, b"version two", &published.secret, None)
            .await
            .unwrap();
        assert!(edited);
        assert_eq!(
            store.access(&published.name, None).await.unwrap().data,
            b"version two"
        );
    }

    #[tokio::test]
    async fn edit_keeps_protection_and_expiry() {
        let (_, store) = memory_store();
        let published = store
            .publish(
                b"first",
                PublishOptions {
                    password: Some("p@ss".to_owned()),
                    lifetime_secs: Some(3600),
                    ..PublishOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            kind(store.edit(&published.name, b"second", &published.secret, None).await),
            ErrorKind::PasswordNeeded
        );
        assert_eq!(
            kind(
                store
                    .edit(&published.name, b"second", &published.secret, Some("nope"))
                    .await
            ),
            ErrorKind::InvalidPassword
        );

        store
            .edit(&published.name, b"second", &published.secret, Some("p@ss"))
            .await
            .unwrap();

        assert_eq!(
            kind(store.access(&published.name, None).await),
            ErrorKind::PasswordNeeded
        );
        let doc = store.access(&published.name, Some("p@ss")).await.unwrap();
        assert_eq!(doc.data, b"second");
        assert_eq!(doc.expires_at, published.expires_at);
    }

    #[tokio::test]
    async fn edit_validates_new_payload() {
        let (_, store) = memory_store();
        let published = store
            .publish(b"original", PublishOptions::default())
            .await
            .unwrap();
        assert_eq!(
            kind(store.edit(&published.name, b"", &published.secret, None).await),
            ErrorKind::InvalidLength
        );
        assert_eq!(
            store.access(&published.name, None).await.unwrap().data,
            b"original"
        );
    }

    #[tokio::test]
    async fn remove_then_gone() {
        let (_, store) = memory_store();
        let published = store
            .publish(b"short-lived", PublishOptions::default())
            .await
            .unwrap();

        assert_eq!(
            kind(store.remove(&published.name, "bad").await),
            ErrorKind::InvalidSecret
        );
        assert!(store.exists(&published.name).await.unwrap());

        assert!(store.remove(&published.name, &published.secret).await.unwrap());
        assert_eq!(
            kind(store.access(&published.name, None).await),
            ErrorKind::DocumentNotFound
        );
        assert!(!store.exists(&published.name).await.unwrap());
        assert_eq!(
            kind(store.remove(&published.name, &published.secret).await),
            ErrorKind::DocumentNotFound
        );
    }

    #[tokio::test]
    async fn remove_reports_failed_delete_as_false() {
        let store = store_with(Arc::new(StuckDeletes(MemoryBackend::new())));
        let published = store
            .publish(b"sticky", PublishOptions::default())
            .await
            .unwrap();

        let removed = store.remove(&published.name, &published.secret).await.unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn duplicate_custom_name_is_rejected() {
        let (_, store) = memory_store();
        let options = || PublishOptions {
            name: Some("abc123".to_owned()),
            ..PublishOptions::default()
        };

        let first = store.publish(b"first", options()).await.unwrap();
        assert_eq!(first.name, "abc123");

        assert_eq!(
            kind(store.publish(b"second", options()).await),
            ErrorKind::NameAlreadyExists
        );
        assert_eq!(store.access("abc123", None).await.unwrap().data, b"first");
    }

    #[tokio::test]
    async fn custom_secret_and_name_length() {
        let (_, store) = memory_store();
        let published = store
            .publish(
                b"data",
                PublishOptions {
                    name_length: Some(20),
                    secret: Some("my own secret".to_owned()),
                    ..PublishOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(published.name.len(), 20);
        assert_eq!(published.secret, "my own secret");
        assert!(store.remove(&published.name, "my own secret").await.unwrap());
    }

    #[tokio::test]
    async fn publish_validation_errors() {
        let (storage, store) = memory_store();
        let max = store.config().max_document_length;

        let cases: Vec<(Vec<u8>, PublishOptions, ErrorKind)> = vec![
            (Vec::new(), PublishOptions::default(), ErrorKind::InvalidLength),
            (vec![b'a'; max + 1], PublishOptions::default(), ErrorKind::InvalidLength),
            (
                b"x".to_vec(),
                PublishOptions {
                    secret: Some(String::new()),
                    ..PublishOptions::default()
                },
                ErrorKind::InvalidLength,
            ),
            (
                b"x".to_vec(),
                PublishOptions {
                    secret: Some("s".repeat(256)),
                    ..PublishOptions::default()
                },
                ErrorKind::InvalidLength,
            ),
            (
                b"x".to_vec(),
                PublishOptions {
                    secret: Some("line\nbreak".to_owned()),
                    ..PublishOptions::default()
                },
                ErrorKind::InvalidInput,
            ),
            (
                b"x".to_vec(),
                PublishOptions {
                    name: Some("no/slashes".to_owned()),
                    ..PublishOptions::default()
                },
                ErrorKind::InvalidInput,
            ),
            (
                b"x".to_vec(),
                PublishOptions {
                    name_length: Some(1),
                    ..PublishOptions::default()
                },
                ErrorKind::InvalidInput,
            ),
            (
                b"x".to_vec(),
                PublishOptions {
                    name_length: Some(33),
                    ..PublishOptions::default()
                },
                ErrorKind::InvalidInput,
            ),
            (
                b"x".to_vec(),
                PublishOptions {
                    password: Some(String::new()),
                    ..PublishOptions::default()
                },
                ErrorKind::InvalidLength,
            ),
            (
                b"x".to_vec(),
                PublishOptions {
                    password: Some("p".repeat(256)),
                    ..PublishOptions::default()
                },
                ErrorKind::InvalidLength,
            ),
        ];

        for (payload, options, expected) in cases {
            let debug = format!("{options:?}");
            assert_eq!(kind(store.publish(&payload, options).await), expected, "{debug}");
        }
        assert!(storage.is_empty().await, "failed publishes must not write");
    }

    #[tokio::test]
    async fn max_length_payload_is_accepted() {
        let (_, store) = memory_store();
        let max = store.config().max_document_length;
        let payload: Vec<u8> = (0..max).map(|i| u8::try_from(i % 251).unwrap()).collect();
        let published = store
            .publish(&payload, PublishOptions::default())
            .await
            .unwrap();
        assert_eq!(store.access(&published.name, None).await.unwrap().data, payload);
    }

    #[tokio::test]
    async fn malformed_names_are_rejected_everywhere() {
        let (_, store) = memory_store();
        for name in ["", "a", "../../etc/passwd", "white space"] {
            assert_eq!(kind(store.access(name, None).await), ErrorKind::InvalidInput);
            assert_eq!(kind(store.exists(name).await), ErrorKind::InvalidInput);
            assert_eq!(kind(store.remove(name, "s").await), ErrorKind::InvalidInput);
            assert_eq!(
                kind(store.edit(name, b"x", "s", None).await),
                ErrorKind::InvalidInput
            );
        }
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let (_, store) = memory_store();
        assert_eq!(
            kind(store.access("nothere", None).await),
            ErrorKind::DocumentNotFound
        );
        assert_eq!(
            kind(store.edit("nothere", b"x", "s", None).await),
            ErrorKind::DocumentNotFound
        );
        assert!(!store.exists("nothere").await.unwrap());
    }

    #[tokio::test]
    async fn lifetime_sets_future_expiry() {
        let (_, store) = memory_store();
        let before = now_millis();
        let published = store
            .publish(
                b"ephemeral",
                PublishOptions {
                    lifetime_secs: Some(60),
                    ..PublishOptions::default()
                },
            )
            .await
            .unwrap();
        let expires_at = published.expires_at.unwrap();
        assert!(expires_at >= before + 60_000);
        assert!(store.exists(&published.name).await.unwrap());

        let permanent = store
            .publish(
                b"forever",
                PublishOptions {
                    lifetime_secs: Some(0),
                    ..PublishOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(permanent.expires_at, None);
    }

    #[tokio::test]
    async fn expired_document_is_gone_and_reclaimed() {
        let (storage, store) = memory_store();
        let envelope = DocumentEnvelope {
            payload: PayloadCodec::new(6, 1024).encode(b"stale", None).unwrap(),
            secret_hash: credential::hash("secret"),
            password_hash: None,
            expires_at: Some(now_millis() - 1_000),
        };
        storage
            .put("oldnews", &envelope.to_bytes(usize::MAX).unwrap())
            .await
            .unwrap();

        assert_eq!(
            kind(store.access("oldnews", None).await),
            ErrorKind::DocumentNotFound
        );
        assert!(!storage.exists("oldnews").await.unwrap());
        assert!(!store.exists("oldnews").await.unwrap());
    }

    #[tokio::test]
    async fn expired_document_cannot_be_edited_or_removed() {
        let (storage, store) = memory_store();
        let expired = || DocumentEnvelope {
            payload: PayloadCodec::new(6, 1024).encode(b"stale", None).unwrap(),
            secret_hash: credential::hash("secret"),
            password_hash: None,
            expires_at: Some(now_millis() - 1_000),
        };

        storage
            .put("lapsed", &expired().to_bytes(usize::MAX).unwrap())
            .await
            .unwrap();
        assert_eq!(
            kind(store.edit("lapsed", b"x", "secret", None).await),
            ErrorKind::DocumentNotFound
        );
        assert!(!storage.exists("lapsed").await.unwrap());

        storage
            .put("lapsed", &expired().to_bytes(usize::MAX).unwrap())
            .await
            .unwrap();
        assert_eq!(
            kind(store.remove("lapsed", "secret").await),
            ErrorKind::DocumentNotFound
        );
        assert!(!storage.exists("lapsed").await.unwrap());
    }

    #[tokio::test]
    async fn expired_custom_name_can_be_reused() {
        let (storage, store) = memory_store();
        let envelope = DocumentEnvelope {
            payload: PayloadCodec::new(6, 1024).encode(b"stale", None).unwrap(),
            secret_hash: credential::hash("secret"),
            password_hash: None,
            expires_at: Some(now_millis() - 1),
        };
        storage
            .put("reused", &envelope.to_bytes(usize::MAX).unwrap())
            .await
            .unwrap();

        let published = store
            .publish(
                b"fresh",
                PublishOptions {
                    name: Some("reused".to_owned()),
                    ..PublishOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.access(&published.name, None).await.unwrap().data, b"fresh");
    }

    #[tokio::test]
    async fn filesystem_backed_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FilesystemBackend::open(dir.path()).unwrap());
        let store = store_with(Arc::clone(&storage) as Arc<dyn StorageBackend>);

        let published = store
            .publish(
                b"Hello, World!",
                PublishOptions {
                    name: Some("-_x".to_owned()),
                    password: Some("hunter2".to_owned()),
                    ..PublishOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(published.name, "-_x");
        assert!(dir.path().join("-_x").is_file());

        assert_eq!(
            kind(store.access("-_x", None).await),
            ErrorKind::PasswordNeeded
        );
        let doc = store.access("-_x", Some("hunter2")).await.unwrap();
        assert_eq!(doc.data, b"Hello, World!");

        assert!(
            store
                .edit("-_x", b"Goodbye", &published.secret, Some("hunter2"))
                .await
                .unwrap()
        );
        let doc = store.access("-_x", Some("hunter2")).await.unwrap();
        assert_eq!(doc.data, b"Goodbye");

        assert!(store.remove("-_x", &published.secret).await.unwrap());
        assert!(!store.exists("-_x").await.unwrap());
        assert!(!dir.path().join("-_x").exists());
    }

    #[tokio::test]
    async fn corrupt_envelope_is_internal_error() {
        let (storage, store) = memory_store();
        storage.put("broken", b"not an envelope").await.unwrap();
        assert_eq!(
            kind(store.access("broken", None).await),
            ErrorKind::InternalError
        );
    }

    #[tokio::test]
    async fn rejects_invalid_config() {
        let config = DocumentConfig {
            alphabet_size: 1,
            ..DocumentConfig::default()
        };
        let result = DocumentStore::new(Arc::new(MemoryBackend::new()), config);
        assert!(result.is_err());
    }
}
