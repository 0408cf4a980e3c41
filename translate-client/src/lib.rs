//! Machine translation client library for the voxclone workspace
//!
//! Provides a unified interface over translation backends:
//! - Google Translate (public web endpoint)
//! - Passthrough (no translation, returns the input)
//! - Mock (configurable, for tests)

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::TranslateConfig;
pub use error::{Result, TranslateError};
pub use provider::{TranslateRequest, Translator};
pub use providers::{
    GoogleTranslator, MockTranslator, PassthroughTranslator, ProviderKind, get_translator,
};
