//! OpenAI-compatible LLM client.
//!
//! Sends each prompt as a single user message to `/v1/chat/completions` and
//! returns the first choice's content. One request per call, no retries.

use crate::config::LlmConfig;
use crate::error::{Result, TreeIndexError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const CONNECTION_CHECK_PROMPT: &str = "Say 'hello' and nothing else.";

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [UserMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI-compatible LLM client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Model name requests are sent with.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/v1/chat/completions", base)
    }

    fn request<'a>(&'a self, prompt: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Send `prompt` as one user message and return the generated text.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.request(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        parse_completion(&body)
    }

    /// Test connectivity to the API.
    pub async fn test_connection(&self) -> Result<()> {
        let content = self.complete(CONNECTION_CHECK_PROMPT).await?;

        if content.to_lowercase().contains("hello") {
            Ok(())
        } else {
            Err(TreeIndexError::LlmApi(format!("Unexpected response: {}", content)))
        }
    }
}

fn api_error(status: StatusCode, body: &str) -> TreeIndexError {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return TreeIndexError::LlmApi(format!(
            "API error ({}): {}",
            status, api_error.error.message
        ));
    }
    TreeIndexError::LlmApi(format!("Request failed ({}): {}", status, body))
}

fn parse_completion(body: &str) -> Result<String> {
    let completion: CompletionResponse = serde_json::from_str(body)?;

    if let Some(usage) = &completion.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "chat completion finished"
        );
    }

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| TreeIndexError::LlmApi("No choices in response".to_string()))?;

    Ok(choice.message.content.unwrap_or_default())
}
