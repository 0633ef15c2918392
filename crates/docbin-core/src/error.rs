//! Error types for `docbin-core`.
//!
//! Lower layers (crypto, codec, envelope) have their own enums. Everything a
//! store operation can fail with is folded into [`DocumentError`], whose
//! [`kind`](DocumentError::kind) gives the stable classification callers map
//! onto transport status codes. Errors never include credentials or payload
//! bytes.

use docbin_storage::StorageError;

/// Errors from cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// AES-256-GCM encryption failed.
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },

    /// AES-256-GCM decryption failed (wrong key, corrupted ciphertext, or tampered tag).
    #[error("decryption failed: {reason}")]
    Decryption { reason: String },

    /// HKDF key derivation failed.
    #[error("key derivation failed for context '{context}': {reason}")]
    KeyDerivation { context: String, reason: String },

    /// Ciphertext is too short to contain a valid nonce + tag.
    #[error("ciphertext too short: expected at least {expected} bytes, got {actual}")]
    CiphertextTooShort { expected: usize, actual: usize },
}

/// Errors from the payload codec.
///
/// Decoding failures are deliberately a single variant: a wrong key, a
/// truncated ciphertext, and corrupt compressed data all look the same.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Compressing or encrypting a payload failed.
    #[error("failed to encode payload: {reason}")]
    Encode { reason: String },

    /// The stored payload could not be turned back into document bytes.
    #[error("stored payload could not be decoded")]
    Decode,
}

/// Errors from reading or writing the persisted envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The record does not start with the envelope magic bytes.
    #[error("not a document envelope (bad magic)")]
    BadMagic,

    /// The record was written by an unknown format version.
    #[error("unsupported envelope version {version}")]
    UnsupportedVersion { version: u8 },

    /// The record body could not be deserialized.
    #[error("malformed envelope: {reason}")]
    Malformed { reason: String },

    /// The envelope has no secret hash.
    #[error("envelope is missing its secret hash")]
    MissingSecretHash,

    /// The envelope could not be serialized.
    #[error("failed to serialize envelope: {reason}")]
    Serialize { reason: String },
}

/// Invalid [`DocumentConfig`](crate::config::DocumentConfig) values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value is out of range or inconsistent with another.
    #[error("invalid document config: {reason}")]
    Invalid { reason: String },
}

/// Stable error classification for document operations.
///
/// Each kind has a machine-readable [`code`](ErrorKind::code) that is part of
/// the public wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A name, secret, or password failed charset or length validation.
    InvalidInput,
    /// No live document exists under the name.
    DocumentNotFound,
    /// The document is password protected and no password was supplied.
    PasswordNeeded,
    /// The supplied password does not match.
    InvalidPassword,
    /// The supplied secret does not match.
    InvalidSecret,
    /// A payload, secret, or password is outside its size bounds.
    InvalidLength,
    /// A custom name is already taken.
    NameAlreadyExists,
    /// Storage or codec failure not caused by the caller.
    InternalError,
}

impl ErrorKind {
    /// Machine-readable error code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::DocumentNotFound => "document_not_found",
            Self::PasswordNeeded => "password_needed",
            Self::InvalidPassword => "invalid_password",
            Self::InvalidSecret => "invalid_secret",
            Self::InvalidLength => "invalid_length",
            Self::NameAlreadyExists => "name_already_exists",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A name, secret, or password failed validation.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The document does not exist or has expired.
    #[error("document not found: {name}")]
    NotFound { name: String },

    /// The document requires a password and none was given.
    #[error("document '{name}' requires a password")]
    PasswordNeeded { name: String },

    /// The given password does not match.
    #[error("invalid password for document '{name}'")]
    InvalidPassword { name: String },

    /// The given secret does not match.
    #[error("invalid secret for document '{name}'")]
    InvalidSecret { name: String },

    /// A value is outside its configured size bounds.
    #[error("{field} length {actual} is outside the allowed range {min}..={max}")]
    InvalidLength {
        field: &'static str,
        actual: usize,
        min: usize,
        max: usize,
    },

    /// The requested custom name is already in use.
    #[error("document name already exists: {name}")]
    NameAlreadyExists { name: String },

    /// No free name could be found within the retry budget.
    #[error("no free document name of length {length} after {attempts} attempts")]
    NameSpaceExhausted { length: usize, attempts: u32 },

    /// The payload codec failed.
    #[error("document codec error: {0}")]
    Codec(#[from] CodecError),

    /// The stored envelope is unreadable or could not be written.
    #[error("document envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// The storage backend failed.
    #[error("document storage error: {0}")]
    Storage(#[from] StorageError),
}

impl DocumentError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::DocumentNotFound,
            Self::PasswordNeeded { .. } => ErrorKind::PasswordNeeded,
            Self::InvalidPassword { .. } => ErrorKind::InvalidPassword,
            Self::InvalidSecret { .. } => ErrorKind::InvalidSecret,
            Self::InvalidLength { .. } => ErrorKind::InvalidLength,
            Self::NameAlreadyExists { .. } => ErrorKind::NameAlreadyExists,
            Self::NameSpaceExhausted { .. }
            | Self::Codec(_)
            | Self::Envelope(_)
            | Self::Storage(_) => ErrorKind::InternalError,
        }
    }
}
