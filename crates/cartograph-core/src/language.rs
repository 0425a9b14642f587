use async_trait::async_trait;

use crate::error::Result;

/// A single-turn call to an external language-understanding service.
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Sends `prompt` under the `system` instruction and returns the reply text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}
