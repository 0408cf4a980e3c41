//! Google Translate provider
//!
//! Uses the public `translate_a/single` web endpoint, which answers with a
//! nested JSON array of translated segments.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::{Result, TranslateError};
use crate::provider::{TranslateRequest, Translator};

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// Provider for the Google Translate web endpoint
pub struct GoogleTranslator {
    base_url: String,
    client: Client,
}

impl GoogleTranslator {
    /// Create a new Google provider
    pub fn new(base_url: Option<&str>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }
}

/// Map the TTS-style language codes to the ones Google expects.
fn normalize_lang(code: &str) -> String {
    let lower = code.trim().to_lowercase();
    match lower.as_str() {
        "" => "auto".to_string(),
        "zh-cn" => "zh-CN".to_string(),
        "zh-tw" => "zh-TW".to_string(),
        _ => lower,
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The first element is a list of `[translated, original, ...]` entries,
/// one per sentence the service segmented the input into.
fn parse_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::InvalidResponse("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(TranslateError::InvalidResponse(
            "no translated text in response".to_string(),
        ));
    }

    Ok(translated)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, request: TranslateRequest) -> Result<String> {
        let source = normalize_lang(request.source_lang.as_deref().unwrap_or("auto"));
        let target = normalize_lang(&request.target_lang);
        let url = format!("{}/translate_a/single", self.base_url);
        debug!(
            "Translating {} chars {} -> {}",
            request.text.chars().count(),
            source,
            target
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", request.text.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            TranslateError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        parse_response(&body)
    }

    fn name(&self) -> &'static str {
        "Google Translate"
    }

    fn is_available(&self) -> Result<()> {
        // No API key required
        Ok(())
    }
}
