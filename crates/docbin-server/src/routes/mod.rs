//! HTTP route handlers for the `docbin` server.
//!
//! Two API versions are served side by side:
//!
//! - `/api/v1/documents`: reduced compatibility view without passwords
//! - `/api/v2/documents`: passwords, lifetimes, and public links
//!
//! Handlers that behave identically in both versions live in this module.

pub mod health;
pub mod v1;
pub mod v2;

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use docbin_core::store::PublishOptions;

use crate::error::AppError;
use crate::state::AppState;

/// Custom document name requested at publish.
pub const KEY_HEADER: HeaderName = HeaderName::from_static("key");
/// Length of the generated document name.
pub const KEY_LENGTH_HEADER: HeaderName = HeaderName::from_static("keylength");
/// Write secret.
pub const SECRET_HEADER: HeaderName = HeaderName::from_static("secret");
/// Read password (v2 only).
pub const PASSWORD_HEADER: HeaderName = HeaderName::from_static("password");
/// Lifetime in seconds (v2 only).
pub const LIFETIME_HEADER: HeaderName = HeaderName::from_static("lifetime");

/// Build the full application router with middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.store.config().max_document_length;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            KEY_HEADER,
            KEY_LENGTH_HEADER,
            SECRET_HEADER,
            PASSWORD_HEADER,
            LIFETIME_HEADER,
        ]);

    Router::new()
        .merge(v1::router())
        .merge(v2::router())
        .merge(health::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub edited: bool,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: bool,
}

// ── Shared handlers ──────────────────────────────────────────────────

/// Whether a live document exists under the name.
async fn exists(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(state.store.exists(&key).await?))
}

/// Delete a document with its secret.
async fn remove(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RemoveResponse>, AppError> {
    let secret = header(&headers, &SECRET_HEADER)?.unwrap_or_default();
    let removed = state.store.remove(&key, &secret).await?;
    Ok(Json(RemoveResponse { removed }))
}

// ── Header parsing ───────────────────────────────────────────────────

/// Read a header as UTF-8. Missing and empty headers are both `None`.
fn header(headers: &HeaderMap, name: &HeaderName) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let value = std::str::from_utf8(value.as_bytes())
        .map_err(|_| AppError::BadRequest(format!("header '{name}' must be valid UTF-8")))?;
    Ok(Some(value.to_owned()).filter(|v| !v.is_empty()))
}

/// Read and parse a numeric header.
fn parsed_header<T: FromStr>(
    headers: &HeaderMap,
    name: &HeaderName,
) -> Result<Option<T>, AppError> {
    header(headers, name)?
        .map(|v| {
            v.trim().parse().map_err(|_| {
                AppError::BadRequest(format!("header '{name}' must be a non-negative integer"))
            })
        })
        .transpose()
}

/// Collect publish options from request headers.
///
/// `password` and `lifetime` are only honoured when `extended` is set.
fn publish_options(headers: &HeaderMap, extended: bool) -> Result<PublishOptions, AppError> {
    let mut options = PublishOptions {
        name: header(headers, &KEY_HEADER)?,
        name_length: parsed_header(headers, &KEY_LENGTH_HEADER)?,
        secret: header(headers, &SECRET_HEADER)?,
        ..PublishOptions::default()
    };
    if extended {
        options.password = header(headers, &PASSWORD_HEADER)?;
        options.lifetime_secs = parsed_header(headers, &LIFETIME_HEADER)?;
    }
    Ok(options)
}
