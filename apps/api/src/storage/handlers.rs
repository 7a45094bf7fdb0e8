//! Axum route handler for presigned resume uploads.

use std::time::Duration;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{require_non_empty, AppError, AppJson};
use crate::state::AppState;

/// Presigned upload URLs expire after 10 minutes.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub url: String,
    pub file_path: String,
}

/// Object key for a new upload: `uploads/<16 hex chars>_<filename>`.
pub fn upload_key(filename: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("uploads/{}_{filename}", &id[..16])
}

/// POST /api/v1/uploads/presign
///
/// Returns a write-only URL for exactly this content type and the key the
/// client must pass back as `filePath` when requesting analysis.
pub async fn handle_presign(
    State(state): State<AppState>,
    AppJson(request): AppJson<PresignRequest>,
) -> Result<Json<PresignResponse>, AppError> {
    const MISSING: &str = "filename and contentType are required";
    let filename = require_non_empty(request.filename, MISSING)?;
    let content_type = require_non_empty(request.content_type, MISSING)?;

    let file_path = upload_key(&filename);
    let url = state
        .blobs
        .presign_upload(&file_path, &content_type, UPLOAD_URL_TTL)
        .await?;

    Ok(Json(PresignResponse { url, file_path }))
}
