use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use metrobot_core::config::LlmConfig;
use metrobot_core::domain::chat::{ChatRole, ChatTurn};

use crate::llm::{LlmClient, LlmError};

/// Non-streaming client for Groq's OpenAI-compatible chat-completions API.
pub struct GroqClient {
    api_key: SecretString,
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: Client,
}

impl GroqClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;
        if api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Request(error.to_string()))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn complete(
        &self,
        messages: &[ChatTurn],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    LlmError::Timeout { timeout_secs: self.timeout_secs }
                } else {
                    LlmError::Request(error.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), detail });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|error| LlmError::Request(format!("invalid completion body: {error}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyCompletion)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatTurn> for WireMessage<'a> {
    fn from(turn: &'a ChatTurn) -> Self {
        let role = match turn.role {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        Self { role, content: &turn.content }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use metrobot_core::config::{AppConfig, LlmConfig};
    use metrobot_core::domain::chat::ChatTurn;

    use super::{ChatCompletionRequest, ChatCompletionResponse, GroqClient, WireMessage};
    use crate::llm::LlmError;

    fn llm_config(api_key: Option<&str>) -> LlmConfig {
        LlmConfig { api_key: api_key.map(|key| key.to_string().into()), ..AppConfig::default().llm }
    }

    #[test]
    fn request_payload_matches_chat_completions_shape() {
        let turns =
            [ChatTurn::system("You are MetroBot."), ChatTurn::user("I want a leather sofa")];
        let request = ChatCompletionRequest {
            model: "llama-3.1-8b-instant",
            messages: turns.iter().map(WireMessage::from).collect(),
            temperature: 0.5,
            max_tokens: 500,
        };

        let payload = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(
            payload,
            json!({
                "model": "llama-3.1-8b-instant",
                "messages": [
                    {"role": "system", "content": "You are MetroBot."},
                    {"role": "user", "content": "I want a leather sofa"}
                ],
                "temperature": 0.5,
                "max_tokens": 500
            })
        );
    }

    #[test]
    fn completion_body_parses_first_choice_content() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Great choice!"}}
            ]
        });

        let completion: ChatCompletionResponse =
            serde_json::from_value(body).expect("body should parse");
        let content = completion.choices.into_iter().next().and_then(|choice| choice.message.content);
        assert_eq!(content.as_deref(), Some("Great choice!"));
    }

    #[test]
    fn construction_requires_an_api_key() {
        let missing = GroqClient::new(&llm_config(None));
        assert!(matches!(missing, Err(LlmError::MissingApiKey)));

        let blank = GroqClient::new(&llm_config(Some("  ")));
        assert!(matches!(blank, Err(LlmError::MissingApiKey)));

        let configured = GroqClient::new(&llm_config(Some("gsk-test")));
        assert!(configured.is_ok());
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let mut config = llm_config(Some("gsk-test"));
        config.base_url = "https://api.groq.com/openai/v1/".to_string();

        let client = GroqClient::new(&config).expect("client should build");
        assert_eq!(client.completions_url(), "https://api.groq.com/openai/v1/chat/completions");
    }
}
