//! Mock translator for testing
//!
//! Simulates a translation backend that either prefixes the text with the
//! target language or fails with an API error. Failures are transient (503)
//! unless the mock was built with `always_rejects`.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TranslateError};
use crate::provider::{TranslateRequest, Translator};

/// A mock translator for testing fallback behavior
pub struct MockTranslator {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: usize,
    /// HTTP status reported by failed calls
    fail_status: u16,
    /// Current call count
    call_count: AtomicUsize,
}

impl MockTranslator {
    /// Create a translator that always succeeds, returning `[target] text`
    pub fn always_succeeds() -> Self {
        Self::fails_then_succeeds(0)
    }

    /// Create a translator that always fails
    pub fn always_fails() -> Self {
        Self::fails_then_succeeds(usize::MAX)
    }

    /// Create a translator that fails `n` times, then succeeds
    pub fn fails_then_succeeds(n: usize) -> Self {
        Self {
            fail_count: n,
            fail_status: 503,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a translator that always fails with a non-retryable 400
    pub fn always_rejects() -> Self {
        Self {
            fail_status: 400,
            ..Self::always_fails()
        }
    }

    /// Get the number of times translate() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, request: TranslateRequest) -> Result<String> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);

        if call_num < self.fail_count {
            return Err(TranslateError::Api {
                status: self.fail_status,
                message: "mock translator unavailable".to_string(),
            });
        }

        Ok(format!("[{}] {}", request.target_lang, request.text))
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds() {
        let translator = MockTranslator::always_succeeds();
        let result = translator
            .translate(TranslateRequest::new("hello", "es"))
            .await
            .unwrap();
        assert_eq!(result, "[es] hello");
        assert_eq!(translator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let translator = MockTranslator::fails_then_succeeds(2);
        let request = TranslateRequest::new("hello", "fr");

        assert!(translator.translate(request.clone()).await.is_err());
        assert!(translator.translate(request.clone()).await.is_err());
        assert!(translator.translate(request).await.is_ok());
        assert_eq!(translator.call_count(), 3);
    }
}
