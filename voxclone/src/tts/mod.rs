//! TTS backend trait and types.

pub mod silence;
#[cfg(feature = "xtts")]
pub mod xtts;

use crate::config::TtsConfig;
use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for a single voice-cloned synthesis.
#[derive(Debug, Clone)]
pub struct TtsOptions {
    /// Reference recording of the voice to clone
    pub speaker_wav: PathBuf,
    /// Language code the text is spoken in (e.g. "en", "zh-cn")
    pub language: String,
}

impl TtsOptions {
    pub fn new(speaker_wav: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            speaker_wav: speaker_wav.into(),
            language: language.into(),
        }
    }
}

/// TTS backend trait - all TTS engines implement this.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize text to a WAV file at `output_path`.
    async fn synthesize(&self, text: &str, output_path: &Path, options: &TtsOptions)
    -> Result<()>;

    /// Synthesize, trying up to `attempts` times before returning the last error.
    async fn synthesize_with_retry(
        &self,
        text: &str,
        output_path: &Path,
        options: &TtsOptions,
        attempts: u32,
    ) -> Result<()> {
        let attempts = attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match self.synthesize(text, output_path, options).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(
                        "Generation failed (attempt {}/{}): {}",
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("All retry attempts failed")))
    }

    /// Engine name reported by the health endpoint.
    fn name(&self) -> &'static str;

    /// Whether the underlying model is in memory.
    fn is_loaded(&self) -> bool;
}

/// Create the TTS backend selected by `config.engine`.
pub fn create_backend(config: &TtsConfig) -> Result<Arc<dyn TtsBackend>> {
    match config.engine.to_lowercase().as_str() {
        "silence" => Ok(Arc::new(silence::SilenceBackend::new())),
        #[cfg(feature = "xtts")]
        "xtts" => Ok(Arc::new(xtts::XttsBackend::new(config)?)),
        #[cfg(not(feature = "xtts"))]
        "xtts" => anyhow::bail!(
            "The xtts engine is not compiled in. Rebuild with `--features xtts` or set tts.engine = \"silence\"."
        ),
        other => anyhow::bail!("Unknown TTS engine '{}'. Expected 'xtts' or 'silence'.", other),
    }
}
