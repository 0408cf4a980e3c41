//! PDF extract-and-chunk, plain text chunking, and chunk synthesis with
//! optional translation.

use super::super::error::{ApiError, ApiResult};
use super::super::extract::ApiJson;
use super::super::state::AppState;
use super::form::UploadForm;
use super::{audio_url, default_language, resolve_voice, synthesize_to_output};
use crate::pdf::{extract_text, is_pdf_filename};
use crate::text::{ChunkMethod, ChunkReport, ChunkingConfig, char_len};
use anyhow::Context;
use axum::Json;
use axum::extract::State;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use translate_client::TranslateRequest;

const PREVIEW_CHARS: usize = 100;

#[derive(Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub filename: String,
    #[serde(flatten)]
    pub report: ChunkReport,
}

#[derive(Serialize)]
pub struct ChunkTextResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: ChunkReport,
}

#[derive(Deserialize)]
pub struct ChunkTextRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub chunk_method: Option<String>,
    /// Number or numeric string
    #[serde(default)]
    pub max_chars: Option<Value>,
}

#[derive(Deserialize)]
pub struct SynthesizeChunksRequest {
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub chunks: Option<Vec<String>>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub translate_to: Option<String>,
    #[serde(default)]
    pub source_lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChunkResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Preview of the submitted chunk
    pub chunk: String,
    /// Characters actually spoken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_length: Option<usize>,
    /// Set when translation was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_chunk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_chunk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct SynthesizeChunksResponse {
    pub success: bool,
    pub results: Vec<ChunkResult>,
    pub total_chunks: usize,
    pub successful: usize,
    pub failed: usize,
}

/// First 100 characters, with "..." when cut.
pub(crate) fn preview(text: &str) -> String {
    if char_len(text) > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

pub(crate) fn parse_chunk_method(value: Option<&str>) -> ApiResult<ChunkMethod> {
    match value {
        None => Ok(ChunkMethod::default()),
        Some(v) => ChunkMethod::parse(v).ok_or_else(|| {
            ApiError::validation(format!(
                "Unknown chunk_method '{}'. Use 'sentences' or 'paragraphs'",
                v
            ))
        }),
    }
}

fn invalid_max_chars() -> ApiError {
    ApiError::validation("max_chars must be a positive integer")
}

pub(crate) fn parse_max_chars(value: Option<&str>) -> ApiResult<Option<usize>> {
    match value {
        None => Ok(None),
        Some(v) => v
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .map(Some)
            .ok_or_else(invalid_max_chars),
    }
}

fn parse_max_chars_value(value: Option<&Value>) -> ApiResult<Option<usize>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|&n| n > 0)
            .map(|n| Some(n as usize))
            .ok_or_else(invalid_max_chars),
        Some(Value::String(s)) => parse_max_chars(Some(s.trim())),
        Some(_) => Err(invalid_max_chars()),
    }
}

/// Language to translate into, if translation applies.
pub(crate) fn translation_target<'a>(
    translate_to: Option<&'a str>,
    source_lang: Option<&str>,
) -> Option<&'a str> {
    let target = translate_to?.trim();
    if target.is_empty() || target.eq_ignore_ascii_case("original") {
        return None;
    }
    if source_lang.is_some_and(|s| s.trim().eq_ignore_ascii_case(target)) {
        return None;
    }
    Some(target)
}

async fn build_report(text: String, method: ChunkMethod, config: ChunkingConfig) -> ApiResult<ChunkReport> {
    let report = tokio::task::spawn_blocking(move || ChunkReport::build(&text, method, config))
        .await
        .context("Chunking task failed")?;
    Ok(report)
}

/// POST /api/pdf/extract: multipart `pdf`, `chunk_method`, `max_chars`.
pub async fn extract_pdf(mut form: UploadForm) -> ApiResult<Json<ExtractResponse>> {
    let pdf = form
        .take_file("pdf")
        .ok_or_else(|| ApiError::validation("No PDF file provided"))?;
    if pdf.file_name.is_empty() {
        return Err(ApiError::validation("No file selected"));
    }
    if !is_pdf_filename(&pdf.file_name) {
        return Err(ApiError::validation("File must be a PDF"));
    }

    let method = parse_chunk_method(form.field("chunk_method"))?;
    let config = ChunkingConfig::for_method(method, parse_max_chars(form.field("max_chars"))?);

    let bytes = pdf.bytes;
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .context("PDF extraction task failed")??;

    let report = build_report(text, method, config).await?;
    info!(
        "Extracted '{}': {} chars, {} chunks ({})",
        pdf.file_name,
        report.total_chars,
        report.total_chunks,
        method.as_str()
    );

    Ok(Json(ExtractResponse {
        success: true,
        filename: pdf.file_name,
        report,
    }))
}

/// POST /api/text/chunk: chunk text sent as JSON.
pub async fn chunk_text(
    ApiJson(request): ApiJson<ChunkTextRequest>,
) -> ApiResult<Json<ChunkTextResponse>> {
    let Some(text) = request.text.filter(|t| !t.trim().is_empty()) else {
        return Err(ApiError::validation("No text provided"));
    };

    let method = parse_chunk_method(request.chunk_method.as_deref())?;
    let config = ChunkingConfig::for_method(method, parse_max_chars_value(request.max_chars.as_ref())?);

    let report = build_report(text, method, config).await?;

    Ok(Json(ChunkTextResponse {
        success: true,
        report,
    }))
}

/// POST /api/pdf/synthesize: synthesize each chunk, translating first when asked.
pub async fn synthesize_chunks(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SynthesizeChunksRequest>,
) -> ApiResult<Json<SynthesizeChunksResponse>> {
    let (Some(voice_id), Some(chunks)) = (
        request.voice_id.filter(|v| !v.trim().is_empty()),
        request.chunks,
    ) else {
        return Err(ApiError::validation("Missing voice_id or chunks"));
    };

    let voice = resolve_voice(&state, &voice_id).await?;
    let target = translation_target(request.translate_to.as_deref(), request.source_lang.as_deref());

    let mut results = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        if chunk.trim().is_empty() {
            results.push(ChunkResult::failed(index, chunk, None, "Empty chunk".to_string()));
            continue;
        }

        let mut spoken = chunk.clone();
        let mut language = request.language.as_str();
        let mut translated = None;

        if let Some(target) = target {
            let mut translate_request = TranslateRequest::new(chunk.as_str(), target);
            if let Some(source) = request.source_lang.as_deref() {
                translate_request = translate_request.with_source(source);
            }

            let attempts = state.config.translation.attempts;
            match state
                .translator
                .translate_with_retry(translate_request, attempts)
                .await
            {
                Ok(text) if !text.trim().is_empty() => {
                    spoken = text;
                    language = target;
                    translated = Some(true);
                }
                Ok(_) => {
                    warn!("Chunk {}: empty translation, using original text", index);
                    translated = Some(false);
                }
                Err(e) => {
                    warn!("Chunk {}: translation to {} failed, using original text: {}", index, target, e);
                    translated = Some(false);
                }
            }
        }

        let result = match synthesize_to_output(&state, &voice, &spoken, language).await {
            Ok(audio_id) => ChunkResult {
                index,
                success: true,
                audio_url: Some(audio_url(&audio_id)),
                audio_id: Some(audio_id),
                chunk: preview(chunk),
                chunk_length: Some(char_len(&spoken)),
                translated,
                original_chunk: (translated == Some(true)).then(|| preview(chunk)),
                translated_chunk: (translated == Some(true)).then(|| preview(&spoken)),
                error: None,
            },
            Err(e) => {
                warn!("Chunk {} failed: {}", index, e);
                ChunkResult::failed(index, chunk, translated, e.to_string())
            }
        };
        results.push(result);
    }

    let successful = results.iter().filter(|r| r.success).count();
    let failed = results.len() - successful;
    info!(
        "Synthesized {}/{} chunks with voice '{}'",
        successful,
        results.len(),
        voice.name
    );

    Ok(Json(SynthesizeChunksResponse {
        success: true,
        total_chunks: results.len(),
        results,
        successful,
        failed,
    }))
}

impl ChunkResult {
    fn failed(index: usize, chunk: &str, translated: Option<bool>, error: String) -> Self {
        Self {
            index,
            success: false,
            audio_id: None,
            audio_url: None,
            chunk: preview(chunk),
            chunk_length: None,
            translated,
            original_chunk: None,
            translated_chunk: None,
            error: Some(error),
        }
    }
}
