//! On-disk layout of the voxclone data directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Default data directory: <platform local data dir>/voxclone
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .map(|d| d.join("voxclone"))
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
}

/// Locations of everything the server stores.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Root data directory
    pub root: PathBuf,
    /// Reference voice samples, one `<voice_id>.wav` each
    pub voices_dir: PathBuf,
    /// Generated audio, one `<audio_id>.wav` each
    pub output_dir: PathBuf,
    /// Voice registry JSON file
    pub registry_file: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            voices_dir: root.join("models").join("voices"),
            output_dir: root.join("output"),
            registry_file: root.join("voices.json"),
            root,
        }
    }

    /// Create the directories if they don't exist yet.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.voices_dir, &self.output_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Path of the reference sample for a voice.
    pub fn voice_sample(&self, voice_id: &str) -> PathBuf {
        self.voices_dir.join(format!("{}.wav", voice_id))
    }

    /// Path of a generated audio file, or `None` for ids that could escape the output dir.
    pub fn audio_file(&self, audio_id: &str) -> Option<PathBuf> {
        is_valid_audio_id(audio_id).then(|| self.output_dir.join(format!("{}.wav", audio_id)))
    }
}

/// Audio ids are generated UUIDs; accept only the characters those use.
pub fn is_valid_audio_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
