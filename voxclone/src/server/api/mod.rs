//! Request handlers, one module per resource.

mod audio;
mod form;
mod health;
mod languages;
mod pdf;
mod synthesis;
mod transform;
mod voices;

pub use audio::get_audio;
pub use health::health;
pub use languages::get_languages;
pub use pdf::{chunk_text, extract_pdf, synthesize_chunks};
pub use synthesis::{batch_synthesize, synthesize};
pub use transform::voice_transform;
pub use voices::{create_voice, delete_voice, list_voices};

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::registry::{DEFAULT_LANGUAGE, VoiceRecord};
use crate::tts::TtsOptions;
use log::debug;
use std::path::PathBuf;
use uuid::Uuid;

pub(crate) fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Public URL of a generated audio file.
pub(crate) fn audio_url(audio_id: &str) -> String {
    format!("/api/audio/{}", audio_id)
}

/// Look up a voice and make sure its reference sample is still on disk.
pub(crate) async fn resolve_voice(state: &AppState, voice_id: &str) -> ApiResult<VoiceRecord> {
    let record = state
        .registry
        .get(voice_id)
        .ok_or_else(|| ApiError::not_found("Voice not found"))?;

    if !tokio::fs::try_exists(&record.audio_path).await.unwrap_or(false) {
        return Err(ApiError::not_found("Voice audio file not found"));
    }

    Ok(record)
}

/// Allocate a fresh audio id and its output path.
pub(crate) fn new_audio_output(state: &AppState) -> (String, PathBuf) {
    let audio_id = Uuid::new_v4().to_string();
    let path = state.paths.output_dir.join(format!("{}.wav", audio_id));
    (audio_id, path)
}

/// Synthesize `text` in the cloned voice and return the new audio id.
pub(crate) async fn synthesize_to_output(
    state: &AppState,
    voice: &VoiceRecord,
    text: &str,
    language: &str,
) -> ApiResult<String> {
    let (audio_id, output_path) = new_audio_output(state);
    let options = TtsOptions::new(voice.audio_path.clone(), language);

    debug!(
        "Synthesizing {} chars as '{}' ({}) -> {}",
        text.chars().count(),
        voice.name,
        language,
        audio_id
    );

    state
        .tts
        .synthesize_with_retry(text, &output_path, &options, state.config.tts.attempts)
        .await
        .map_err(|e| ApiError::external(format!("Synthesis failed: {:#}", e)))?;

    Ok(audio_id)
}

/// Parse an optional numeric form value.
pub(crate) fn parse_f64(name: &str, value: Option<&str>, default: f64) -> ApiResult<f64> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| ApiError::validation(format!("{} must be a number", name))),
    }
}
