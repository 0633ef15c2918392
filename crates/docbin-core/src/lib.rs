//! Core library for `docbin`.
//!
//! Contains the document persistence pipeline: name and secret generation,
//! salted credential hashing, the compress-then-encrypt payload codec, the
//! on-disk envelope format, and the [`store::DocumentStore`] that composes
//! them into the publish/access/edit/remove/exists operations. This crate
//! depends on `docbin-storage` for the byte storage trait and knows nothing
//! about HTTP.

pub mod codec;
pub mod config;
pub mod credential;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod identifier;
pub mod store;
