//! Voice registry endpoints.

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;
use super::default_language;
use super::form::UploadForm;
use crate::registry::{VoiceRecord, VoiceSummary};
use anyhow::Context;
use axum::Json;
use axum::extract::{Path, State};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_VOICE_NAME: &str = "Unnamed Voice";

#[derive(Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceSummary>,
}

#[derive(Serialize)]
pub struct CreateVoiceResponse {
    pub success: bool,
    pub voice_id: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct DeleteVoiceResponse {
    pub success: bool,
}

pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: state.registry.list(),
    })
}

/// POST /api/voices: register a voice from a multipart `audio` upload.
pub async fn create_voice(
    State(state): State<Arc<AppState>>,
    mut form: UploadForm,
) -> ApiResult<Json<CreateVoiceResponse>> {
    let audio = form
        .take_file("audio")
        .ok_or_else(|| ApiError::validation("No audio file provided"))?;
    if audio.file_name.is_empty() || audio.bytes.is_empty() {
        return Err(ApiError::validation("No file selected"));
    }

    let name = form.field("name").unwrap_or(DEFAULT_VOICE_NAME).to_string();
    let language = form
        .field("language")
        .map(str::to_string)
        .unwrap_or_else(default_language);

    let voice_id = Uuid::new_v4().to_string();
    let sample_path = state.paths.voice_sample(&voice_id);
    tokio::fs::write(&sample_path, &audio.bytes)
        .await
        .with_context(|| format!("Failed to save voice sample {}", sample_path.display()))?;

    let record = VoiceRecord::new(name.clone(), language, sample_path.clone());
    if let Err(e) = state.registry.insert(voice_id.clone(), record).await {
        let _ = tokio::fs::remove_file(&sample_path).await;
        return Err(e.into());
    }

    info!("Registered voice '{}' ({})", name, voice_id);

    Ok(Json(CreateVoiceResponse {
        success: true,
        voice_id,
        name,
    }))
}

pub async fn delete_voice(
    State(state): State<Arc<AppState>>,
    Path(voice_id): Path<String>,
) -> ApiResult<Json<DeleteVoiceResponse>> {
    let record = state
        .registry
        .remove(&voice_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Voice not found"))?;

    if let Err(e) = tokio::fs::remove_file(&record.audio_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(
                "Voice {} removed but its sample {} could not be deleted: {}",
                voice_id,
                record.audio_path.display(),
                e
            );
        }
    }

    info!("Deleted voice '{}' ({})", record.name, voice_id);

    Ok(Json(DeleteVoiceResponse { success: true }))
}
