//! Shared application state handed to every handler.

use crate::audio::AudioTools;
use crate::config::VoxcloneConfig;
use crate::paths::AppPaths;
use crate::registry::VoiceRegistry;
use crate::tts::TtsBackend;
use anyhow::{Context, Result};
use std::sync::Arc;
use translate_client::Translator;

pub struct AppState {
    pub config: VoxcloneConfig,
    pub paths: AppPaths,
    pub registry: VoiceRegistry,
    pub tts: Arc<dyn TtsBackend>,
    pub translator: Arc<dyn Translator>,
    pub audio: AudioTools,
}

impl AppState {
    /// Prepare the data directory and open the voice registry.
    pub fn new(
        config: VoxcloneConfig,
        tts: Arc<dyn TtsBackend>,
        translator: Arc<dyn Translator>,
    ) -> Result<Self> {
        let paths = AppPaths::new(config.resolved_data_dir()?);
        paths.ensure()?;

        let registry = VoiceRegistry::open(&paths.registry_file).with_context(|| {
            format!("Failed to open voice registry {}", paths.registry_file.display())
        })?;
        let audio = AudioTools::from_config(&config);

        Ok(Self {
            config,
            paths,
            registry,
            tts,
            translator,
            audio,
        })
    }
}
