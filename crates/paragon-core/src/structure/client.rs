//! Chat-completion client for the structuring step.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, SetupError};
use crate::models::config::LlmConfig;

/// One-shot chat completion against a language-model service.
pub trait ChatClient {
    /// Send a single user prompt and return the model's text reply.
    fn complete(&self, model: &str, prompt: &str) -> Result<String, ParseError>;
}

/// HTTP client for an OpenAI-style `/v1/chat/completions` endpoint.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Build a client from configuration and the API key.
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self, SetupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SetupError::InvalidConfig(format!("LLM HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }
}

/// Request body for `/v1/chat/completions`.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from `/v1/chat/completions`.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatClient for OpenAiClient {
    fn complete(&self, model: &str, prompt: &str) -> Result<String, ParseError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| ParseError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParseError::Service {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ParseError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ParseError::Malformed("reply had no choices".to_string()))
    }
}

/// Scripted chat client for tests: replays one reply per configured model.
pub struct MockChatClient {
    replies: Vec<(String, Result<String, String>)>,
}

impl MockChatClient {
    /// A client that answers every model with the same reply.
    pub fn always(reply: &str) -> Self {
        Self {
            replies: vec![("*".to_string(), Ok(reply.to_string()))],
        }
    }

    /// A client with per-model replies; `Err` simulates a service failure.
    pub fn scripted(replies: Vec<(String, Result<String, String>)>) -> Self {
        Self { replies }
    }
}

impl ChatClient for MockChatClient {
    fn complete(&self, model: &str, _prompt: &str) -> Result<String, ParseError> {
        for (m, reply) in &self.replies {
            if m == "*" || m == model {
                return match reply {
                    Ok(text) => Ok(text.clone()),
                    Err(reason) => Err(ParseError::Service {
                        status: 500,
                        body: reason.clone(),
                    }),
                };
            }
        }
        Err(ParseError::Http(format!("no scripted reply for {model}")))
    }
}
