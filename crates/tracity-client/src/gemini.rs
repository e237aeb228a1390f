//! Google Gemini `generateContent` client.
//!
//! The system message travels as `systemInstruction` and the reply is
//! requested as `application/json`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracity_core::error::AppError;
use tracity_core::{HttpConfig, LlmProviderType, default_completion_model};

use crate::reply::{llm_error, parse_json_reply, transport_error};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// HTTP client for the Gemini API.
///
/// # Examples
///
/// ```no_run
/// use tracity_client::GeminiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClient::new("your-api-key")?;
/// let reply = client.generate_json("Respond with JSON.", "Describe [1, 2]").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Error response from Gemini API
#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

fn text_content(role: Option<&str>, text: &str) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

impl GeminiClient {
    /// Creates a new Gemini client with the default model.
    pub fn new(api_key: &str) -> Result<Self, AppError> {
        Self::with_model(api_key, default_completion_model(LlmProviderType::Gemini))
    }

    /// Creates a new Gemini client with a specific model.
    pub fn with_model(api_key: &str, model: &str) -> Result<Self, AppError> {
        let http_config = HttpConfig::default();
        let client = Client::builder()
            .timeout(http_config.timeout)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens: http_config.max_tokens,
            timeout_secs: http_config.timeout.as_secs(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", BASE_URL, self.model)
    }

    fn request(&self, system: &str, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            system_instruction: text_content(None, system),
            contents: vec![text_content(Some("user"), prompt)],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                max_output_tokens: self.max_tokens,
            },
        }
    }

    /// Generates content and parses the reply as JSON.
    pub async fn generate_json(&self, system: &str, prompt: &str) -> Result<Value, AppError> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.clone())
            .json(&self.request(system, prompt))
            .send()
            .await
            .map_err(|e| transport_error("gemini", e, self.timeout_secs))?;

        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();

            let message = match serde_json::from_str::<GeminiError>(&error_text) {
                Ok(err) => err.error.message,
                Err(_) => format!("HTTP {}: {}", status_code, error_text),
            };

            return Err(llm_error("gemini", status_code, message));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            AppError::ClientError(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text: String = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .ok_or(AppError::EmptyResponse)?;

        parse_json_reply(&text)
    }
}

// =============================================================================
// Trait Implementation: CompletionProvider
// =============================================================================

impl tracity_core::traits::CompletionProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value, AppError> {
        self.generate_json(system, prompt).await
    }
}
