//! Admin media upload.
//!
//! Accepts a base64 PNG data-URL, stores the decoded bytes under the static
//! mount and returns the relative URL. Anything that is not a PNG data-URL
//! is rejected before any filesystem work happens.

use std::path::Path as FsPath;
use std::sync::LazyLock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

static PNG_DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/png;base64,([A-Za-z0-9+/=]+)$").expect("valid literal pattern")
});

pub fn router() -> Router<AppState> {
    Router::new().route("/media/upload", post(upload))
}

#[derive(Debug, Deserialize)]
struct MediaUploadRequest {
    #[serde(rename = "dataUrl")]
    data_url: String,
}

#[derive(Debug, Serialize)]
struct MediaUploadResponse {
    url: String,
}

async fn upload(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<MediaUploadRequest>,
) -> Result<(StatusCode, Json<MediaUploadResponse>)> {
    let captures = PNG_DATA_URL
        .captures(&body.data_url)
        .ok_or_else(|| AppError::BadRequest("only PNG data URLs are accepted".to_owned()))?;

    let bytes = BASE64
        .decode(&captures[1])
        .map_err(|_| AppError::BadRequest("invalid base64 payload".to_owned()))?;

    let file_name = format!("media_{}.png", Uuid::new_v4().simple());
    let uploads_dir = FsPath::new(&state.config().static_dir).join("uploads");

    tokio::fs::create_dir_all(&uploads_dir)
        .await
        .map_err(|e| AppError::Internal(format!("failed to create uploads dir: {e}")))?;
    tokio::fs::write(uploads_dir.join(&file_name), &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(MediaUploadResponse {
            url: format!("/static/uploads/{file_name}"),
        }),
    ))
}
