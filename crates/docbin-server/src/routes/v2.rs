//! Document routes: `/api/v2/documents/*`
//!
//! Adds password protection, lifetimes, and public links on top of v1.
//! Passwords are read from the `password` header, or for reads also from
//! the `?password=` query parameter.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use docbin_core::store::Document;

use super::{
    EditResponse, PASSWORD_HEADER, SECRET_HEADER, exists, header, publish_options, remove,
};
use crate::error::AppError;
use crate::state::AppState;

/// Build the v2 router.
///
/// Paths:
/// - `POST   /api/v2/documents`: publish
/// - `GET    /api/v2/documents/{key}`: access
/// - `PATCH  /api/v2/documents/{key}`: edit
/// - `DELETE /api/v2/documents/{key}`: remove
/// - `GET    /api/v2/documents/{key}/raw`: raw access
/// - `GET    /api/v2/documents/{key}/exists`: existence check
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v2/documents", post(publish))
        .route(
            "/api/v2/documents/{key}",
            get(access).patch(edit).delete(remove),
        )
        .route("/api/v2/documents/{key}/raw", get(access_raw))
        .route("/api/v2/documents/{key}/exists", get(exists))
}

// ── Request / response types ─────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AccessQuery {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub key: String,
    pub secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub key: String,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<i64>,
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn publish(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PublishResponse>, AppError> {
    let options = publish_options(&headers, true)?;
    let published = state.store.publish(&body, options).await?;
    Ok(Json(PublishResponse {
        url: state.document_url(&published.name),
        key: published.name,
        secret: published.secret,
        expiration_timestamp: published.expires_at,
    }))
}

async fn access(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<AccessQuery>,
    headers: HeaderMap,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = load(&state, &key, query, &headers).await?;
    Ok(Json(DocumentResponse {
        url: state.document_url(&doc.name),
        data: String::from_utf8_lossy(&doc.data).into_owned(),
        key: doc.name,
        expiration_timestamp: doc.expires_at,
    }))
}

async fn access_raw(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<AccessQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let doc = load(&state, &key, query, &headers).await?;
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], doc.data))
}

async fn edit(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EditResponse>, AppError> {
    let secret = header(&headers, &SECRET_HEADER)?.unwrap_or_default();
    let password = header(&headers, &PASSWORD_HEADER)?;
    let edited = state
        .store
        .edit(&key, &body, &secret, password.as_deref())
        .await?;
    Ok(Json(EditResponse { edited }))
}

/// Access a document with the password from the header, else the query.
async fn load(
    state: &AppState,
    key: &str,
    query: AccessQuery,
    headers: &HeaderMap,
) -> Result<Document, AppError> {
    let password = header(headers, &PASSWORD_HEADER)?.or(query.password);
    Ok(state.store.access(key, password.as_deref()).await?)
}
