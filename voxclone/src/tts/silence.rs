//! Silent engine for development machines without a speech model.
//!
//! Produces a valid WAV whose length follows the text, so every endpoint
//! can be exercised end to end without Python.

use super::{TtsBackend, TtsOptions};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

pub const SAMPLE_RATE: u32 = 16_000;

/// Roughly how long a character takes to speak.
const MILLIS_PER_CHAR: u64 = 60;
const MIN_MILLIS: u64 = 500;

#[derive(Debug, Default)]
pub struct SilenceBackend;

impl SilenceBackend {
    pub fn new() -> Self {
        Self
    }

    /// Number of samples written for `text`.
    pub fn sample_count(text: &str) -> u32 {
        let millis = (text.chars().count() as u64 * MILLIS_PER_CHAR).max(MIN_MILLIS);
        (millis * SAMPLE_RATE as u64 / 1000) as u32
    }
}

/// Write `samples` zero samples as mono 16-bit PCM.
pub fn write_silence(path: &Path, samples: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for _ in 0..samples {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;

    Ok(())
}

#[async_trait]
impl TtsBackend for SilenceBackend {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        _options: &TtsOptions,
    ) -> Result<()> {
        let samples = Self::sample_count(text);
        let output_path = output_path.to_path_buf();

        tokio::task::spawn_blocking(move || write_silence(&output_path, samples))
            .await
            .context("Task join error")??;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "silence"
    }

    fn is_loaded(&self) -> bool {
        true
    }
}
