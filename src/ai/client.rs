//! LLM (`OpenAI`) API client module
//!
//! Encapsulates the hosted model call used to generate stand-up summaries.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

use crate::core::capabilities::SummaryModel;
use crate::errors::LlmError;

const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

/// Five short bullets never need more than this.
const MAX_OUTPUT_TOKENS: usize = 1_024;

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// LLM API client for generating summaries
pub struct LlmClient {
    http: Client,
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    timeout: Duration,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        api_key: String,
        org_id: Option<String>,
        model_name: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::HttpError(format!("Failed to build OpenAI HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            org_id,
            model_name,
            timeout,
        })
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap, LlmError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|e| LlmError::HttpError(format!("Invalid Authorization header: {e}")))?;
        headers.insert("Authorization", auth_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                LlmError::HttpError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl SummaryModel for LlmClient {
    async fn complete(&self, prompt: &[ChatCompletionMessage]) -> Result<String, LlmError> {
        #[cfg(feature = "debug-logs")]
        info!("Using model prompt:\n{:?}", prompt);

        let estimated_input_tokens = prompt
            .iter()
            .map(|msg| estimate_tokens(&format!("{:?}", msg.content)))
            .sum::<usize>();
        info!(
            "Invoking model {} with ~{} input tokens",
            self.model_name, estimated_input_tokens
        );

        let request_body = json!({
            "model": self.model_name,
            "input": build_responses_input_from_prompt(prompt),
            "max_output_tokens": MAX_OUTPUT_TOKENS
        });

        let response = self
            .http
            .post(RESPONSES_URL)
            .headers(self.headers()?)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::HttpError(format!("OpenAI API request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(LlmError::ProviderError(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            LlmError::ProviderError(format!("Failed to parse OpenAI response: {e}"))
        })?;

        extract_output_text(&response_json).ok_or(LlmError::EmptyResponse)
    }
}

/// Build Responses API input payload from a chat-style prompt.
/// Assistant turns are skipped since the Responses API treats them as output.
pub(crate) fn build_responses_input_from_prompt(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter(|m| !matches!(m.role, MessageRole::assistant))
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                _ => "user",
            };
            match &m.content {
                Content::Text(t) => Some(json!({
                    "role": role_str,
                    "content": [{ "type": "input_text", "text": t }]
                })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

/// Pull the generated text out of a Responses API body.
///
/// Prefers the `output_text` convenience field and falls back to joining
/// every `output_text` part of the `output` items.
pub(crate) fn extract_output_text(response_json: &Value) -> Option<String> {
    if let Some(text) = response_json.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let collected: Vec<&str> = response_json
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| {
            let text = part.get("text")?;
            text.as_str()
                .or_else(|| text.get("value").and_then(Value::as_str))
        })
        .collect();

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n"))
    }
}
