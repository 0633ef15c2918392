//! Document name and secret generation.
//!
//! Names are drawn from a prefix of a fixed 64-symbol URL-safe alphabet and
//! checked against storage until an unused one turns up. Their only security
//! property is uniqueness; the secret is the actual write credential, so the
//! thread RNG is fine for both.

use std::sync::Arc;

use docbin_storage::StorageBackend;
use rand::Rng;
use tracing::debug;

use crate::error::DocumentError;

/// Canonical name alphabet. The first 62 symbols are the legacy alphanumeric
/// alphabet, so shorter configured alphabets stay compatible with old names.
pub const ALPHABET: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";

/// Number of alphanumeric symbols at the start of [`ALPHABET`].
pub const ALPHANUMERIC_SIZE: usize = 62;

/// Separator between generated secret chunks.
pub const SECRET_SEPARATOR: char = '-';

/// Draw `length` uniformly random symbols from the first `alphabet_size`
/// characters of [`ALPHABET`].
///
/// `alphabet_size` is clamped to `1..=64`.
#[must_use]
pub fn random_string(length: usize, alphabet_size: usize) -> String {
    let symbols = &ALPHABET[..alphabet_size.clamp(1, ALPHABET.len())];
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(symbols[rng.random_range(0..symbols.len())]))
        .collect()
}

/// Build a human-shareable secret: `chunk_count` alphanumeric chunks of
/// `chunk_length` characters joined by [`SECRET_SEPARATOR`].
#[must_use]
pub fn generate_secret(chunk_count: usize, chunk_length: usize) -> String {
    (0..chunk_count)
        .map(|_| random_string(chunk_length, ALPHANUMERIC_SIZE))
        .collect::<Vec<_>>()
        .join(&SECRET_SEPARATOR.to_string())
}

/// Whether `name` is an acceptable document name: length within
/// `min..=max` and every character taken from the full [`ALPHABET`].
#[must_use]
pub fn is_valid_name(name: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&name.len()) && name.bytes().all(|b| ALPHABET.contains(&b))
}

/// Allocates document names that are unused at the time of the check.
///
/// There is no reservation: two concurrent callers can both see a name as
/// free and race to write it. The store accepts that window.
pub struct IdentifierGenerator {
    storage: Arc<dyn StorageBackend>,
    alphabet_size: usize,
    max_attempts: u32,
}

impl IdentifierGenerator {
    /// Create a generator that checks candidate names against `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, alphabet_size: usize, max_attempts: u32) -> Self {
        Self {
            storage,
            alphabet_size,
            max_attempts,
        }
    }

    /// Generate a name of `length` symbols for which no document exists.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::Storage`] if the existence check fails.
    /// - [`DocumentError::NameSpaceExhausted`] if every attempt collided.
    pub async fn generate_unique_name(&self, length: usize) -> Result<String, DocumentError> {
        for attempt in 1..=self.max_attempts {
            let candidate = random_string(length, self.alphabet_size);
            if !self.storage.exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!(attempt, length, "generated name already taken, retrying");
        }

        Err(DocumentError::NameSpaceExhausted {
            length,
            attempts: self.max_attempts,
        })
    }
}

impl std::fmt::Debug for IdentifierGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierGenerator")
            .field("alphabet_size", &self.alphabet_size)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
