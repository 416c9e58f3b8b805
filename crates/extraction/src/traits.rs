use async_trait::async_trait;

use crate::remote::AiError;

/// Anything that turns a prompt into free-form model output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}
