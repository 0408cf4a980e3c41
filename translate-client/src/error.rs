use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Translation request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Translation API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid translation response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TranslateError {
    /// Whether retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) | Self::Config(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslateError>;
