use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use threadcast_common::Result;

/// One completion returned by a text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// The seam the content generator talks through. Tests script it directly.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single-shot completion. Implementations attempt the call once.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Sends a tiny prompt; `Ok(false)` when the service does not answer.
    async fn health_check(&self) -> Result<bool> {
        match self.generate("Respond with just 'OK'", None, Some(5), Some(0.1)).await {
            Ok(resp) => Ok(!resp.text.trim().is_empty()),
            Err(e) => {
                tracing::warn!(model = self.model_name(), "llm health check failed: {e}");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str;
}
