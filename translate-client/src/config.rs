use serde::{Deserialize, Serialize};

/// Translation backend configuration, embedded in the host program's config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Provider identifier (google, none)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Custom base URL (for the google provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Tries per text when the backend reports a transient failure
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_attempts() -> u32 {
    2
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
            attempts: default_attempts(),
        }
    }
}
