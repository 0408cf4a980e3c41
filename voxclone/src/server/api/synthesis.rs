//! Single and batch speech synthesis.

use super::super::error::{ApiError, ApiResult};
use super::super::extract::ApiJson;
use super::super::state::AppState;
use super::{audio_url, default_language, resolve_voice, synthesize_to_output};
use axum::Json;
use axum::extract::State;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SynthesizeRequest {
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Serialize)]
pub struct SynthesizeResponse {
    pub success: bool,
    pub audio_id: String,
    pub audio_url: String,
}

#[derive(Deserialize)]
pub struct BatchSynthesizeRequest {
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub texts: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Serialize)]
pub struct BatchItem {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct BatchSynthesizeResponse {
    pub results: Vec<BatchItem>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/synthesize
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SynthesizeRequest>,
) -> ApiResult<Json<SynthesizeResponse>> {
    let (Some(voice_id), Some(text)) = (non_blank(request.voice_id), non_blank(request.text))
    else {
        return Err(ApiError::validation("Missing voice_id or text"));
    };

    let voice = resolve_voice(&state, &voice_id).await?;
    let audio_id = synthesize_to_output(&state, &voice, &text, &request.language).await?;

    info!("Synthesized {} with voice '{}'", audio_id, voice.name);

    Ok(Json(SynthesizeResponse {
        success: true,
        audio_url: audio_url(&audio_id),
        audio_id,
    }))
}

/// POST /api/batch-synthesize: one audio file per text; failures stay per item.
pub async fn batch_synthesize(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<BatchSynthesizeRequest>,
) -> ApiResult<Json<BatchSynthesizeResponse>> {
    let Some(voice_id) = non_blank(request.voice_id) else {
        return Err(ApiError::validation("Missing voice_id or texts"));
    };
    if request.texts.is_empty() {
        return Err(ApiError::validation("Missing voice_id or texts"));
    }

    let voice = resolve_voice(&state, &voice_id).await?;

    let mut results = Vec::with_capacity(request.texts.len());
    for (index, text) in request.texts.into_iter().enumerate() {
        let outcome = if text.trim().is_empty() {
            Err(ApiError::validation("Empty text"))
        } else {
            synthesize_to_output(&state, &voice, &text, &request.language).await
        };

        results.push(match outcome {
            Ok(audio_id) => BatchItem {
                index,
                success: true,
                audio_url: Some(audio_url(&audio_id)),
                audio_id: Some(audio_id),
                text,
                error: None,
            },
            Err(e) => {
                warn!("Batch item {} failed: {}", index, e);
                BatchItem {
                    index,
                    success: false,
                    audio_id: None,
                    audio_url: None,
                    text,
                    error: Some(e.to_string()),
                }
            }
        });
    }

    Ok(Json(BatchSynthesizeResponse { results }))
}
