//! Salted credential digests for document secrets and passwords.
//!
//! # Format
//!
//! `salt (16 bytes) || SHA-256(salt || credential) (32 bytes)`
//!
//! The salt is fresh per call, so hashing the same secret twice yields two
//! different digests. Verification compares the full digest with
//! `subtle::ConstantTimeEq`; it never stops at the first differing byte.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// SHA-256 output length in bytes.
const DIGEST_LEN: usize = 32;

/// Total length of a stored credential digest.
pub const HASH_LEN: usize = SALT_LEN + DIGEST_LEN;

/// Hash a credential with a freshly generated salt.
#[must_use]
pub fn hash(credential: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let mut stored = Vec::with_capacity(HASH_LEN);
    stored.extend_from_slice(&salt);
    stored.extend_from_slice(&salted_digest(&salt, credential));
    stored
}

/// Check `candidate` against a digest produced by [`hash`].
///
/// A stored value of the wrong length never matches.
#[must_use]
pub fn compare(candidate: &str, stored: &[u8]) -> bool {
    if stored.len() != HASH_LEN {
        return false;
    }
    let (salt, expected) = stored.split_at(SALT_LEN);
    let actual = salted_digest(salt, candidate);
    bool::from(actual.as_slice().ct_eq(expected))
}

fn salted_digest(salt: &[u8], credential: &str) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(credential.as_bytes());
    hasher.finalize().into()
}
