//! Document store configuration.
//!
//! A [`DocumentConfig`] is built once at start-up (the server fills it from
//! the environment) and handed to [`DocumentStore::new`](crate::store::DocumentStore::new).
//! Nothing in this crate reads the environment directly.

use crate::error::ConfigError;
use crate::identifier::ALPHABET;

/// Limits and defaults for document operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Maximum payload size in bytes for publish and edit.
    pub max_document_length: usize,
    /// Length of generated names when the caller does not ask for one.
    pub default_name_length: usize,
    /// Minimum length of custom names and requested name lengths.
    pub min_name_length: usize,
    /// Maximum length of custom names and requested name lengths.
    pub max_name_length: usize,
    /// How many symbols of the canonical alphabet generated names draw from.
    pub alphabet_size: usize,
    /// Number of `-`-separated chunks in a generated secret.
    pub secret_chunk_count: usize,
    /// Characters per secret chunk.
    pub secret_chunk_length: usize,
    /// Maximum length of a custom secret.
    pub max_secret_length: usize,
    /// Maximum length of a password.
    pub max_password_length: usize,
    /// zlib compression level (0..=9).
    pub compression_level: u32,
    /// Collisions tolerated while generating a unique name.
    pub max_name_attempts: u32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_document_length: 400_000,
            default_name_length: 8,
            min_name_length: 2,
            max_name_length: 32,
            alphabet_size: ALPHABET.len(),
            secret_chunk_count: 4,
            secret_chunk_length: 5,
            max_secret_length: 255,
            max_password_length: 255,
            compression_level: 6,
            max_name_attempts: 1000,
        }
    }
}

impl DocumentConfig {
    /// Check that every value is in range and the values agree with each other.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid { reason });

        if self.max_document_length == 0 {
            return invalid("max_document_length must be positive".to_owned());
        }
        if self.min_name_length == 0 || self.min_name_length > self.max_name_length {
            return invalid(format!(
                "name length bounds {}..={} are not a valid range",
                self.min_name_length, self.max_name_length
            ));
        }
        if !(self.min_name_length..=self.max_name_length).contains(&self.default_name_length) {
            return invalid(format!(
                "default_name_length {} is outside {}..={}",
                self.default_name_length, self.min_name_length, self.max_name_length
            ));
        }
        if !(2..=ALPHABET.len()).contains(&self.alphabet_size) {
            return invalid(format!(
                "alphabet_size {} must be within 2..={}",
                self.alphabet_size,
                ALPHABET.len()
            ));
        }
        if self.secret_chunk_count == 0 || self.secret_chunk_length == 0 {
            return invalid("generated secrets need at least one non-empty chunk".to_owned());
        }
        if self.generated_secret_length() > self.max_secret_length {
            return invalid(format!(
                "generated secrets ({} chars) exceed max_secret_length {}",
                self.generated_secret_length(),
                self.max_secret_length
            ));
        }
        if self.max_password_length == 0 {
            return invalid("max_password_length must be positive".to_owned());
        }
        if self.compression_level > 9 {
            return invalid(format!(
                "compression_level {} must be within 0..=9",
                self.compression_level
            ));
        }
        if self.max_name_attempts == 0 {
            return invalid("max_name_attempts must be positive".to_owned());
        }
        Ok(())
    }

    /// Length of a secret produced by the generator, separators included.
    #[must_use]
    pub fn generated_secret_length(&self) -> usize {
        self.secret_chunk_count
            .saturating_mul(self.secret_chunk_length)
            .saturating_add(self.secret_chunk_count.saturating_sub(1))
    }

    /// Upper bound on the size of a stored envelope.
    ///
    /// Covers incompressible payloads plus deflate framing, the AEAD nonce
    /// and tag, and both credential digests.
    #[must_use]
    pub fn max_envelope_length(&self) -> usize {
        self.max_document_length
            .saturating_add(self.max_document_length / 8)
            .saturating_add(4096)
    }
}
