use async_trait::async_trait;
use log::warn;

use crate::error::Result;

/// Request to translate a piece of text
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    pub text: String,
    /// Source language code, `None` lets the backend detect it
    pub source_lang: Option<String>,
    pub target_lang: String,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: None,
            target_lang: target_lang.into(),
        }
    }

    pub fn with_source(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = Some(source_lang.into());
        self
    }
}

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate the request text, returning the translated text
    async fn translate(&self, request: TranslateRequest) -> Result<String>;

    /// Translate, repeating up to `attempts` times while the error is retryable.
    async fn translate_with_retry(
        &self,
        request: TranslateRequest,
        attempts: u32,
    ) -> Result<String> {
        let attempts = attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.translate(request.clone()).await {
                Err(e) if attempt < attempts && e.is_retryable() => {
                    warn!(
                        "{} translation failed (attempt {}/{}): {}",
                        self.name(),
                        attempt,
                        attempts,
                        e
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Get the backend name for display
    fn name(&self) -> &'static str;

    /// Check if the backend is usable with its current configuration
    fn is_available(&self) -> Result<()>;
}
