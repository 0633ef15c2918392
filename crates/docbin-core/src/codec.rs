//! Reversible transformation between submitted bytes and stored bytes.
//!
//! Write path: `raw → zlib compress → (AES-256-GCM encrypt, if a password is
//! given)`. Read path undoes the layers in reverse order. Compression always
//! applies; encryption only for password-protected documents.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::crypto::{self, EncryptionKey};
use crate::error::CodecError;

/// Compresses and optionally encrypts document payloads.
#[derive(Debug, Clone)]
pub struct PayloadCodec {
    level: Compression,
    max_decoded_len: usize,
}

impl PayloadCodec {
    /// Create a codec using zlib `level` (0..=9) that refuses to inflate more
    /// than `max_decoded_len` bytes.
    #[must_use]
    pub fn new(level: u32, max_decoded_len: usize) -> Self {
        Self {
            level: Compression::new(level.min(9)),
            max_decoded_len,
        }
    }

    /// Encode a raw payload for storage, encrypting it under `password` if given.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if compression or encryption fails.
    pub fn encode(&self, raw: &[u8], password: Option<&str>) -> Result<Vec<u8>, CodecError> {
        let compressed = self.compress(raw)?;
        let Some(password) = password else {
            return Ok(compressed);
        };

        let key = EncryptionKey::from_password(password).map_err(|e| CodecError::Encode {
            reason: e.to_string(),
        })?;
        crypto::encrypt(&key, &compressed).map_err(|e| CodecError::Encode {
            reason: e.to_string(),
        })
    }

    /// Decode stored bytes back into the original payload.
    ///
    /// `password` must be given exactly when the payload was encrypted.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] for any failure: wrong key, truncated
    /// or tampered ciphertext, corrupt compressed data, or output larger than
    /// the configured maximum.
    pub fn decode(&self, stored: &[u8], password: Option<&str>) -> Result<Vec<u8>, CodecError> {
        match password {
            Some(password) => {
                let key = EncryptionKey::from_password(password).map_err(|_| CodecError::Decode)?;
                let compressed = crypto::decrypt(&key, stored).map_err(|_| CodecError::Decode)?;
                self.decompress(&compressed)
            }
            None => self.decompress(stored),
        }
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(raw.len() / 2), self.level);
        let compress_err = |e: std::io::Error| CodecError::Encode {
            reason: format!("compression failed: {e}"),
        };
        encoder.write_all(raw).map_err(compress_err)?;
        encoder.finish().map_err(compress_err)
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
        let limit = u64::try_from(self.max_decoded_len)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        let mut out = Vec::new();
        ZlibDecoder::new(compressed)
            .take(limit)
            .read_to_end(&mut out)
            .map_err(|_| CodecError::Decode)?;

        if out.len() > self.max_decoded_len {
            return Err(CodecError::Decode);
        }
        Ok(out)
    }
}
