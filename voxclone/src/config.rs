//! voxclone configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use translate_client::TranslateConfig;

const DEFAULT_XTTS_MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxcloneConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Root for voices, generated audio and the registry. None means the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Largest accepted upload in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// ffmpeg executable. None means `ffmpeg` on PATH.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// ffprobe executable. None means `ffprobe` on PATH.
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    #[serde(default)]
    pub tts: TtsConfig,

    #[serde(default)]
    pub translation: TranslateConfig,
}

/// Speech synthesis engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Engine to use: "xtts" (needs the `xtts` build feature) or "silence"
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Coqui model identifier for the xtts engine
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Use the GPU when one is available
    #[serde(default = "default_gpu")]
    pub gpu: bool,

    /// Extra site-packages directory holding the `TTS` Python package
    #[serde(default)]
    pub python_site_packages: Option<PathBuf>,

    /// Attempts per synthesis before giving up
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_mb() -> usize {
    100
}

fn default_engine() -> String {
    if cfg!(feature = "xtts") {
        "xtts".to_string()
    } else {
        "silence".to_string()
    }
}

fn default_model_name() -> String {
    DEFAULT_XTTS_MODEL.to_string()
}

fn default_gpu() -> bool {
    true
}

fn default_attempts() -> u32 {
    1
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            model_name: default_model_name(),
            gpu: default_gpu(),
            python_site_packages: None,
            attempts: default_attempts(),
        }
    }
}

impl Default for VoxcloneConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: None,
            max_upload_mb: default_max_upload_mb(),
            ffmpeg_path: None,
            ffprobe_path: None,
            tts: TtsConfig::default(),
            translation: TranslateConfig::default(),
        }
    }
}

impl VoxcloneConfig {
    /// Get the config file path: ~/.config/voxclone/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("voxclone")
            .join("config.toml"))
    }

    /// Load config from a file, returning defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: VoxcloneConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Data directory, falling back to the platform default
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => crate::paths::default_data_dir(),
        }
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
