//! Shared application state for the `docbin` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use docbin_core::store::DocumentStore;

/// Shared application state passed to all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// The document store.
    pub store: DocumentStore,
    /// Public base URL for document links, without trailing slash.
    pub public_url: Option<String>,
}

impl AppState {
    /// The public link for a document, if a base URL is configured.
    #[must_use]
    pub fn document_url(&self, name: &str) -> Option<String> {
        self.public_url.as_ref().map(|base| format!("{base}/{name}"))
    }
}
