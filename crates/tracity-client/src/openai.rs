//! OpenAI chat completions client.
//!
//! Sends a system and a user message and asks for a JSON object back
//! (`response_format: json_object`). The default model is `gpt-3.5-turbo`.
//!
//! # Examples
//!
//! ```no_run
//! use tracity_client::OpenAIClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAIClient::new("sk-your-api-key")?;
//! let reply = client
//!     .chat_json("Always respond with valid JSON.", "Summarize: [1, 2, 3]")
//!     .await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracity_core::error::AppError;
use tracity_core::{HttpConfig, LlmProviderType, default_completion_model};

use crate::reply::{llm_error, parse_json_reply, transport_error};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// HTTP client for OpenAI's Chat Completions API.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
    timeout_secs: u64,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Error response from OpenAI API
#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl OpenAIClient {
    /// Creates a new OpenAI client with the default model.
    pub fn new(api_key: &str) -> Result<Self, AppError> {
        Self::with_model(api_key, default_completion_model(LlmProviderType::OpenAI))
    }

    /// Creates a new OpenAI client with a specific model.
    pub fn with_model(api_key: &str, model: &str) -> Result<Self, AppError> {
        Self::with_config(api_key, model, None)
    }

    /// Creates a new OpenAI client with full configuration.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name
    /// * `endpoint` - Custom API endpoint (for Azure OpenAI or proxies)
    pub fn with_config(
        api_key: &str,
        model: &str,
        endpoint: Option<&str>,
    ) -> Result<Self, AppError> {
        let http_config = HttpConfig::default();
        let client = Client::builder()
            .timeout(http_config.timeout)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string(),
            max_tokens: http_config.max_tokens,
            timeout_secs: http_config.timeout.as_secs(),
        })
    }

    /// Returns the model being used.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs one chat completion and parses the reply as JSON.
    pub async fn chat_json(&self, system: &str, prompt: &str) -> Result<Value, AppError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error("openai", e, self.timeout_secs))?;

        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();

            let message = match serde_json::from_str::<OpenAIError>(&error_text) {
                Ok(err) => match err.error.error_type {
                    Some(kind) => format!("{} ({})", err.error.message, kind),
                    None => err.error.message,
                },
                Err(_) => format!("HTTP {}: {}", status_code, error_text),
            };

            return Err(llm_error("openai", status_code, message));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AppError::ClientError(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AppError::EmptyResponse)?;

        parse_json_reply(&content)
    }
}

// =============================================================================
// Trait Implementation: CompletionProvider
// =============================================================================

impl tracity_core::traits::CompletionProvider for OpenAIClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value, AppError> {
        self.chat_json(system, prompt).await
    }
}
