//! `docbin` HTTP server.
//!
//! Wires together the document store, storage backend, and HTTP routes into a
//! running Axum server. Serves the v1 and v2 document APIs under `/api/*`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
