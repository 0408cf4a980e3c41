//! Voice registry: persisted voice metadata keyed by voice id.

mod store;
mod types;

pub use store::{RegistryError, VoiceRegistry};
pub use types::{DEFAULT_LANGUAGE, VoiceRecord, VoiceSummary};
