use async_trait::async_trait;

use crate::error::Result;
use crate::provider::{TranslateRequest, Translator};

/// Translator that returns its input unchanged (translation disabled)
#[derive(Debug, Clone, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, request: TranslateRequest) -> Result<String> {
        Ok(request.text)
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}
