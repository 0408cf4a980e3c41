//! Voice transform: speed and pitch adjustment of an uploaded recording.

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;
use super::form::UploadForm;
use super::{audio_url, new_audio_output, parse_f64, resolve_voice};
use crate::audio::{Emotion, TransformSettings};
use anyhow::Context;
use axum::Json;
use axum::extract::State;
use log::info;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

#[derive(Serialize)]
pub struct TransformResponse {
    pub success: bool,
    pub audio_id: String,
    pub audio_url: String,
    pub target_voice_id: String,
    /// Whether ffmpeg changed the audio; false means it was returned as is
    pub transform_applied: bool,
    pub original_duration: Option<f64>,
    pub transformed_duration: Option<f64>,
    pub settings: TransformSettings,
}

/// POST /api/voice-transform
pub async fn voice_transform(
    State(state): State<Arc<AppState>>,
    mut form: UploadForm,
) -> ApiResult<Json<TransformResponse>> {
    let source = form
        .take_file("source_audio")
        .filter(|f| !f.bytes.is_empty())
        .ok_or_else(|| ApiError::validation("No source audio provided"))?;
    let target_voice_id = form
        .field("target_voice_id")
        .ok_or_else(|| ApiError::validation("Missing target_voice_id"))?
        .to_string();

    let emotion_name = form.field("emotion").unwrap_or("neutral");
    let emotion = Emotion::parse(emotion_name)
        .ok_or_else(|| ApiError::validation(format!("Unknown emotion '{}'", emotion_name)))?;
    let settings = TransformSettings::new(
        parse_f64("speed", form.field("speed"), 1.0)?,
        parse_f64("pitch", form.field("pitch"), 1.0)?,
        emotion,
        parse_f64("intensity", form.field("intensity"), 0.5)?,
    );

    resolve_voice(&state, &target_voice_id).await?;

    let mut upload = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".wav")
        .tempfile()
        .context("Failed to create temp file")?;
    upload
        .write_all(&source.bytes)
        .context("Failed to store uploaded audio")?;

    let (audio_id, output_path) = new_audio_output(&state);
    let tools = state.audio.clone();

    let (applied, original_duration, transformed_duration) =
        tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            let original = tools.get_audio_duration_secs(upload.path());
            let applied = tools.transform_audio(upload.path(), &output_path, &settings)?;
            let transformed = tools.get_audio_duration_secs(&output_path);
            Ok((applied, original, transformed))
        })
        .await
        .context("Transform task failed")?
        .map_err(|e| ApiError::external(format!("Voice transform failed: {:#}", e)))?;

    info!(
        "Transformed audio {} (applied={}, speed={}, pitch={})",
        audio_id, applied, settings.speed, settings.pitch
    );

    Ok(Json(TransformResponse {
        success: true,
        audio_url: audio_url(&audio_id),
        audio_id,
        target_voice_id,
        transform_applied: applied,
        original_duration,
        transformed_duration,
        settings,
    }))
}
