//! Translation backend implementations

mod google;
pub mod mock;
mod passthrough;

pub use google::GoogleTranslator;
pub use mock::MockTranslator;
pub use passthrough::PassthroughTranslator;

use crate::config::TranslateConfig;
use crate::error::{Result, TranslateError};
use crate::provider::Translator;

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    Passthrough,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" | "google-translate" => Ok(Self::Google),
            "none" | "passthrough" | "off" => Ok(Self::Passthrough),
            _ => Err(TranslateError::Config(format!("Unknown provider: {}", s))),
        }
    }
}

/// Create a translator instance from configuration
pub fn get_translator(config: &TranslateConfig) -> Result<Box<dyn Translator>> {
    match ProviderKind::parse(&config.provider)? {
        ProviderKind::Google => Ok(Box::new(GoogleTranslator::new(
            config.base_url.as_deref(),
            config.timeout_secs,
        )?)),
        ProviderKind::Passthrough => Ok(Box::new(PassthroughTranslator)),
    }
}
