//! Voice transformation using FFmpeg filters.
//!
//! Speed and pitch are applied with `asetrate`/`aresample`/`atempo`. When
//! FFmpeg is missing or nothing needs changing, the input is copied as is.

use crate::config::VoxcloneConfig;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Sample rate assumed when ffprobe can't tell (XTTS output rate).
const FALLBACK_SAMPLE_RATE: u32 = 24_000;

const MIN_FACTOR: f64 = 0.5;
const MAX_FACTOR: f64 = 2.0;

/// Tone preset requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Excited,
    Calm,
    Serious,
}

impl Emotion {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "neutral" => Some(Self::Neutral),
            "happy" => Some(Self::Happy),
            "sad" => Some(Self::Sad),
            "angry" => Some(Self::Angry),
            "excited" => Some(Self::Excited),
            "calm" => Some(Self::Calm),
            "serious" => Some(Self::Serious),
            _ => None,
        }
    }
}

/// Requested adjustments for a voice transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformSettings {
    /// Playback speed factor (0.5-2.0)
    pub speed: f64,
    /// Pitch factor (0.5-2.0)
    pub pitch: f64,
    pub emotion: Emotion,
    /// Emotion intensity (0.0-1.0)
    pub intensity: f64,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 1.0,
            emotion: Emotion::Neutral,
            intensity: 0.5,
        }
    }
}

impl TransformSettings {
    /// Build settings, clamping every value into its accepted range.
    pub fn new(speed: f64, pitch: f64, emotion: Emotion, intensity: f64) -> Self {
        Self {
            speed: clamp_factor(speed),
            pitch: clamp_factor(pitch),
            emotion,
            intensity: if intensity.is_finite() {
                intensity.clamp(0.0, 1.0)
            } else {
                0.5
            },
        }
    }
}

fn clamp_factor(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(MIN_FACTOR, MAX_FACTOR)
    } else {
        1.0
    }
}

fn is_unity(value: f64) -> bool {
    (value - 1.0).abs() < 1e-3
}

/// Build the `-af` filter chain for `settings`, or `None` if the audio
/// would come out unchanged.
///
/// Pitch is shifted by resampling, which also changes tempo by the same
/// factor; the `atempo` stages compensate so that only `speed` affects
/// duration. `atempo` accepts 0.5-2.0 per stage, so larger factors are
/// chained.
pub fn build_filter_chain(settings: &TransformSettings, sample_rate: u32) -> Option<String> {
    let mut filters = Vec::new();

    if !is_unity(settings.pitch) {
        let shifted = (sample_rate as f64 * settings.pitch).round() as u32;
        filters.push(format!("asetrate={}", shifted));
        filters.push(format!("aresample={}", sample_rate));
    }

    let mut tempo = settings.speed / settings.pitch;
    while tempo > MAX_FACTOR {
        filters.push(format!("atempo={}", MAX_FACTOR));
        tempo /= MAX_FACTOR;
    }
    while tempo < MIN_FACTOR {
        filters.push(format!("atempo={}", MIN_FACTOR));
        tempo /= MIN_FACTOR;
    }
    if !is_unity(tempo) {
        filters.push(format!("atempo={}", tempo));
    }

    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

/// Locations of the FFmpeg tools.
#[derive(Debug, Clone)]
pub struct AudioTools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for AudioTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl AudioTools {
    /// Use configured tool paths, falling back to `PATH` lookup.
    pub fn from_config(config: &VoxcloneConfig) -> Self {
        let defaults = Self::default();
        Self {
            ffmpeg: config.ffmpeg_path.clone().unwrap_or(defaults.ffmpeg),
            ffprobe: config.ffprobe_path.clone().unwrap_or(defaults.ffprobe),
        }
    }

    fn ffmpeg_command(&self) -> Command {
        Command::new(&self.ffmpeg)
    }

    fn ffprobe_command(&self) -> Command {
        Command::new(&self.ffprobe)
    }

    /// Check that ffmpeg runs.
    pub fn is_ffmpeg_available(&self) -> bool {
        self.ffmpeg_command()
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn probe(&self, audio_path: &Path, entries: &str, stream: bool) -> Option<String> {
        let mut cmd = self.ffprobe_command();
        cmd.args(["-v", "quiet"]);
        if stream {
            cmd.args(["-select_streams", "a:0"]);
        }
        let output = cmd
            .args(["-show_entries", entries, "-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(audio_path)
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() { None } else { Some(value) }
    }

    /// Duration of an audio file in seconds, if ffprobe can read it.
    pub fn get_audio_duration_secs(&self, audio_path: &Path) -> Option<f64> {
        self.probe(audio_path, "format=duration", false)?
            .parse()
            .ok()
    }

    /// Sample rate of the first audio stream, if ffprobe can read it.
    pub fn get_sample_rate(&self, audio_path: &Path) -> Option<u32> {
        self.probe(audio_path, "stream=sample_rate", true)?
            .parse()
            .ok()
    }

    /// Transform `input` into `output`. Returns whether a filter was applied;
    /// `false` means `output` is an unchanged copy.
    pub fn transform_audio(
        &self,
        input: &Path,
        output: &Path,
        settings: &TransformSettings,
    ) -> Result<bool> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let sample_rate = self.get_sample_rate(input).unwrap_or(FALLBACK_SAMPLE_RATE);
        let Some(filter) = build_filter_chain(settings, sample_rate) else {
            std::fs::copy(input, output).context("Failed to copy audio")?;
            return Ok(false);
        };

        if !self.is_ffmpeg_available() {
            warn!("ffmpeg not found; returning audio without speed/pitch changes");
            std::fs::copy(input, output).context("Failed to copy audio")?;
            return Ok(false);
        }

        debug!("ffmpeg -af {}", filter);
        let result = self
            .ffmpeg_command()
            .args(["-y", "-i"])
            .arg(input)
            .args(["-af", &filter])
            .arg(output)
            .output()
            .context("Failed to run ffmpeg")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("ffmpeg transform failed: {}", stderr);
        }

        Ok(true)
    }
}
