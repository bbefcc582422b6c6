use async_trait::async_trait;
use thiserror::Error;

use metrobot_core::domain::chat::ChatTurn;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm api key is not configured")]
    MissingApiKey,
    #[error("llm request failed: {0}")]
    Request(String),
    #[error("llm request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("llm returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("llm response contained no completion text")]
    EmptyCompletion,
}

/// Completion provider seam. One call per turn; retries, if any, belong to the
/// implementation behind this trait, not to the orchestrator.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatTurn],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}
