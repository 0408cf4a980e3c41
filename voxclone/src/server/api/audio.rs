use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::Arc;

/// GET /api/audio/{id}: stream a generated WAV file.
pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Path(audio_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let path = state
        .paths
        .audio_file(&audio_id)
        .ok_or_else(|| ApiError::not_found("Audio not found"))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("Audio not found"));
        }
        Err(e) => {
            return Err(ApiError::Internal(
                anyhow::Error::new(e).context(format!("Failed to read {}", path.display())),
            ));
        }
    };

    Ok(([(header::CONTENT_TYPE, "audio/wav")], bytes))
}
