//! Legacy document routes: `/api/v1/documents/*`
//!
//! The v1 API predates password protection. It never forwards a password,
//! so protected documents answer `password_needed` here.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use super::{EditResponse, SECRET_HEADER, exists, header, publish_options, remove};
use crate::error::AppError;
use crate::state::AppState;

/// Build the v1 router.
///
/// Paths:
/// - `POST   /api/v1/documents`: publish
/// - `GET    /api/v1/documents/{key}`: access
/// - `PATCH  /api/v1/documents/{key}`: edit
/// - `DELETE /api/v1/documents/{key}`: remove
/// - `GET    /api/v1/documents/{key}/raw`: raw access
/// - `GET    /api/v1/documents/{key}/exists`: existence check
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/documents", post(publish))
        .route(
            "/api/v1/documents/{key}",
            get(access).patch(edit).delete(remove),
        )
        .route("/api/v1/documents/{key}/raw", get(access_raw))
        .route("/api/v1/documents/{key}/exists", get(exists))
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub key: String,
    pub secret: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub key: String,
    pub data: String,
}

async fn publish(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PublishResponse>, AppError> {
    let options = publish_options(&headers, false)?;
    let published = state.store.publish(&body, options).await?;
    Ok(Json(PublishResponse {
        key: published.name,
        secret: published.secret,
    }))
}

async fn access(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = state.store.access(&key, None).await?;
    Ok(Json(DocumentResponse {
        key: doc.name,
        data: String::from_utf8_lossy(&doc.data).into_owned(),
    }))
}

async fn access_raw(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let doc = state.store.access(&key, None).await?;
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], doc.data))
}

async fn edit(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EditResponse>, AppError> {
    let secret = header(&headers, &SECRET_HEADER)?.unwrap_or_default();
    let edited = state.store.edit(&key, &body, &secret, None).await?;
    Ok(Json(EditResponse { edited }))
}
