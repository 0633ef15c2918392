//! Server configuration for `docbin`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `DOCBIN_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use docbin_core::config::DocumentConfig;

/// Default listen port.
const DEFAULT_PORT: u16 = 8080;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Public base URL used to build document links, without trailing slash.
    pub public_url: Option<String>,
    /// Document limits and generation parameters.
    pub documents: DocumentConfig,
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (data lost on restart).
    Memory,
    /// One file per document under `path`.
    Filesystem { path: PathBuf },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DOCBIN_BIND_ADDR`: full bind address (default: `127.0.0.1:8080`)
    /// - `PORT`: port to bind on `0.0.0.0` when `DOCBIN_BIND_ADDR` is unset
    /// - `DOCBIN_STORAGE`: `filesystem` or `memory` (default: `filesystem`)
    /// - `DOCBIN_STORAGE_PATH`: document directory (default: `./documents`)
    /// - `DOCBIN_LOG_LEVEL`: log filter (default: `info`)
    /// - `DOCBIN_PUBLIC_URL`: base URL for document links (optional)
    /// - `DOCBIN_MAX_DOCUMENT_LENGTH`: maximum payload bytes
    /// - `DOCBIN_KEY_LENGTH`: default generated name length
    /// - `DOCBIN_MIN_KEY_LENGTH` / `DOCBIN_MAX_KEY_LENGTH`: name length bounds
    /// - `DOCBIN_KEY_ALPHABET_SIZE`: generated name alphabet prefix, 2..=64
    /// - `DOCBIN_COMPRESSION_LEVEL`: zlib level, 0..=9
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        // Priority: DOCBIN_BIND_ADDR > PORT > default 127.0.0.1:8080
        let default_addr = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));
        let bind_addr = if let Some(addr) = var("DOCBIN_BIND_ADDR") {
            addr.parse().unwrap_or(default_addr)
        } else if let Some(port) = var("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(DEFAULT_PORT)))
        } else {
            default_addr
        };

        let storage_path = var("DOCBIN_STORAGE_PATH").unwrap_or_else(|| "./documents".to_owned());
        let storage_backend = match var("DOCBIN_STORAGE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackendType::Memory,
            _ => StorageBackendType::Filesystem {
                path: PathBuf::from(storage_path),
            },
        };

        let log_level = var("DOCBIN_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let public_url = var("DOCBIN_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty());

        let defaults = DocumentConfig::default();
        let parsed = |name: &str| var(name).and_then(|v| v.trim().parse().ok());
        let documents = DocumentConfig {
            max_document_length: parsed("DOCBIN_MAX_DOCUMENT_LENGTH")
                .unwrap_or(defaults.max_document_length),
            default_name_length: parsed("DOCBIN_KEY_LENGTH")
                .unwrap_or(defaults.default_name_length),
            min_name_length: parsed("DOCBIN_MIN_KEY_LENGTH").unwrap_or(defaults.min_name_length),
            max_name_length: parsed("DOCBIN_MAX_KEY_LENGTH").unwrap_or(defaults.max_name_length),
            alphabet_size: parsed("DOCBIN_KEY_ALPHABET_SIZE").unwrap_or(defaults.alphabet_size),
            compression_level: var("DOCBIN_COMPRESSION_LEVEL")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.compression_level),
            ..defaults
        };

        Self {
            bind_addr,
            storage_backend,
            log_level,
            public_url,
            documents,
        }
    }
}
