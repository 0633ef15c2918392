//! The persisted document record.
//!
//! # Layout
//!
//! ```text
//! "DBIN" (4 bytes) || version (1 byte) || bincode(DocumentEnvelope)
//! ```
//!
//! The body uses bincode's varint encoding with a size limit, so a corrupt
//! length prefix cannot trigger a huge allocation. Optional fields keep their
//! absent/present distinction through the round trip.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;

/// Magic bytes at the start of every envelope.
const MAGIC: &[u8; 4] = b"DBIN";

/// Current envelope format version.
const VERSION: u8 = 1;

/// Header length: magic plus version byte.
const HEADER_LEN: usize = MAGIC.len() + 1;

/// A stored document: encoded payload plus its access-control header.
///
/// The document name is not part of the record; it is the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    /// Compressed, and for password-protected documents encrypted, content.
    pub payload: Vec<u8>,
    /// Salted digest of the write secret. Never empty.
    pub secret_hash: Vec<u8>,
    /// Salted digest of the read password, if the document has one.
    pub password_hash: Option<Vec<u8>>,
    /// Expiry as Unix milliseconds; `None` means permanent.
    pub expires_at: Option<i64>,
}

impl DocumentEnvelope {
    /// Whether reading this document needs a password (and its payload is encrypted).
    #[must_use]
    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether the document is logically gone at `now_ms` (Unix milliseconds).
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_ms)
    }

    /// Serialize to the on-disk layout.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MissingSecretHash`] if `secret_hash` is empty.
    /// - [`EnvelopeError::Serialize`] if the body exceeds `limit` bytes.
    pub fn to_bytes(&self, limit: usize) -> Result<Vec<u8>, EnvelopeError> {
        if self.secret_hash.is_empty() {
            return Err(EnvelopeError::MissingSecretHash);
        }

        let body = body_options(limit)
            .serialize(self)
            .map_err(|e| EnvelopeError::Serialize {
                reason: e.to_string(),
            })?;

        let mut bytes = Vec::with_capacity(HEADER_LEN.saturating_add(body.len()));
        bytes.extend_from_slice(MAGIC);
        bytes.push(VERSION);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Parse the on-disk layout.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::BadMagic`] if the magic bytes are missing.
    /// - [`EnvelopeError::UnsupportedVersion`] for unknown versions.
    /// - [`EnvelopeError::Malformed`] if the body does not decode within `limit` bytes.
    /// - [`EnvelopeError::MissingSecretHash`] if the record has no secret hash.
    pub fn from_bytes(bytes: &[u8], limit: usize) -> Result<Self, EnvelopeError> {
        let Some((magic, rest)) = bytes.split_first_chunk::<4>() else {
            return Err(EnvelopeError::BadMagic);
        };
        if magic != MAGIC {
            return Err(EnvelopeError::BadMagic);
        }

        let Some((&version, body)) = rest.split_first() else {
            return Err(EnvelopeError::Malformed {
                reason: "missing version byte".to_owned(),
            });
        };
        if version != VERSION {
            return Err(EnvelopeError::UnsupportedVersion { version });
        }

        let envelope: Self =
            body_options(limit)
                .deserialize(body)
                .map_err(|e| EnvelopeError::Malformed {
                    reason: e.to_string(),
                })?;

        if envelope.secret_hash.is_empty() {
            return Err(EnvelopeError::MissingSecretHash);
        }
        Ok(envelope)
    }
}

fn body_options(limit: usize) -> impl Options {
    bincode::DefaultOptions::new().with_limit(u64::try_from(limit).unwrap_or(u64::MAX))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024 * 1024;

    fn sample() -> DocumentEnvelope {
        DocumentEnvelope {
            payload: vec![1, 2, 3, 4, 5],
            secret_hash: vec![9; 48],
            password_hash: None,
            expires_at: None,
        }
    }

    #[test]
    fn starts_with_magic_and_version() {
        let bytes = sample().to_bytes(LIMIT).unwrap();
        assert_eq!(&bytes[..4], b"DBIN");
        assert_eq!(bytes[4], 1);
    }

    #[test]
    fn optional_fields_keep_presence() {
        let absent = sample();
        let present = DocumentEnvelope {
            password_hash: Some(vec![7; 48]),
            expires_at: Some(0),
            ..sample()
        };
        for envelope in [absent, present] {
            let bytes = envelope.to_bytes(LIMIT).unwrap();
            assert_eq!(DocumentEnvelope::from_bytes(&bytes, LIMIT).unwrap(), envelope);
        }
    }

    #[test]
    fn rejects_bad_magic_and_version() {
        let mut bytes = sample().to_bytes(LIMIT).unwrap();
        bytes[4] = 99;
        assert!(matches!(
            DocumentEnvelope::from_bytes(&bytes, LIMIT),
            Err(EnvelopeError::UnsupportedVersion { version: 99 })
        ));

        bytes[0] = b'X';
        assert!(matches!(
            DocumentEnvelope::from_bytes(&bytes, LIMIT),
            Err(EnvelopeError::BadMagic)
        ));
        assert!(matches!(
            DocumentEnvelope::from_bytes(b"DB", LIMIT),
            Err(EnvelopeError::BadMagic)
        ));
    }

    #[test]
    fn rejects_truncated_body() {
        let bytes = sample().to_bytes(LIMIT).unwrap();
        let result = DocumentEnvelope::from_bytes(&bytes[..bytes.len() - 3], LIMIT);
        assert!(matches!(result, Err(EnvelopeError::Malformed { .. })));

        let result = DocumentEnvelope::from_bytes(b"DBIN", LIMIT);
        assert!(matches!(result, Err(EnvelopeError::Malformed { .. })));
    }

    #[test]
    fn body_limit_is_enforced() {
        let big = DocumentEnvelope {
            payload: vec![0; 10_000],
            ..sample()
        };
        assert!(matches!(
            big.to_bytes(1_000),
            Err(EnvelopeError::Serialize { .. })
        ));

        let bytes = big.to_bytes(LIMIT).unwrap();
        assert!(matches!(
            DocumentEnvelope::from_bytes(&bytes, 1_000),
            Err(EnvelopeError::Malformed { .. })
        ));
    }

    #[test]
    fn secret_hash_is_mandatory() {
        let envelope = DocumentEnvelope {
            secret_hash: Vec::new(),
            ..sample()
        };
        assert!(matches!(
            envelope.to_bytes(LIMIT),
            Err(EnvelopeError::MissingSecretHash)
        ));
    }

    #[test]
    fn expiry_check() {
        let permanent = sample();
        assert!(!permanent.is_expired_at(i64::MAX));

        let expiring = DocumentEnvelope {
            expires_at: Some(1_000),
            ..sample()
        };
        assert!(!expiring.is_expired_at(999));
        assert!(expiring.is_expired_at(1_000));
        assert!(expiring.is_expired_at(5_000));
    }
}
