use serde::Serialize;
use slack_morphism::errors::SlackClientError;
use std::time::Duration;
use thiserror::Error;

use crate::utils::retry::{RetryClass, Retryable};

/// Errors raised by the chat platform layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlackError {
    #[error("Failed to access Slack API: {0}")]
    ApiError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Slack server error: {0}")]
    ServerError(String),

    #[error("Slack rate limited the request")]
    RateLimited { retry_after: Option<Duration> },

    #[error("{0}")]
    GeneralError(String),
}

/// Slack error codes that indicate a platform-side fault worth retrying.
const SERVER_ERROR_CODES: &[&str] = &[
    "internal_error",
    "fatal_error",
    "service_unavailable",
    "request_timeout",
];

impl SlackError {
    /// Map the `error` code of an `ok: false` Slack response.
    #[must_use]
    pub fn from_error_code(code: &str) -> Self {
        match code {
            "ratelimited" | "rate_limited" => SlackError::RateLimited { retry_after: None },
            c if SERVER_ERROR_CODES.contains(&c) => SlackError::ServerError(c.to_string()),
            "" => SlackError::ApiError("unknown".to_string()),
            c => SlackError::ApiError(c.to_string()),
        }
    }
}

impl From<SlackClientError> for SlackError {
    fn from(error: SlackClientError) -> Self {
        match error {
            SlackClientError::RateLimitError(e) => SlackError::RateLimited {
                retry_after: e.retry_after,
            },
            SlackClientError::ApiError(e) => SlackError::from_error_code(&e.code),
            SlackClientError::HttpError(e) if e.status_code.as_u16() == 429 => {
                SlackError::RateLimited { retry_after: None }
            }
            SlackClientError::HttpError(e) if e.status_code.is_server_error() => {
                SlackError::ServerError(format!("HTTP {}", e.status_code))
            }
            SlackClientError::HttpError(e) => {
                SlackError::ApiError(format!("HTTP {}", e.status_code))
            }
            e @ (SlackClientError::HttpProtocolError(_)
            | SlackClientError::SystemError(_)
            | SlackClientError::EndOfStream(_)) => SlackError::HttpError(e.to_string()),
            e => SlackError::GeneralError(e.to_string()),
        }
    }
}

impl Retryable for SlackError {
    fn classify(&self) -> RetryClass {
        match self {
            SlackError::RateLimited { retry_after } => RetryClass::Throttled(*retry_after),
            SlackError::ServerError(_) | SlackError::HttpError(_) => RetryClass::Transient,
            SlackError::ApiError(_) | SlackError::GeneralError(_) => RetryClass::Terminal,
        }
    }
}

/// Errors raised while invoking the hosted model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Model invocation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to access OpenAI API: {0}")]
    ProviderError(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

impl Retryable for LlmError {
    fn classify(&self) -> RetryClass {
        match self {
            LlmError::HttpError(_) | LlmError::Timeout(_) => RetryClass::Transient,
            LlmError::ProviderError(_) | LlmError::EmptyResponse => RetryClass::Terminal,
        }
    }
}

/// Failure taxonomy surfaced to the invoking environment.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch channel history: {0}")]
    FetchError(String),

    #[error("Failed to generate summary: {0}")]
    GenerationError(String),

    #[error("Failed to publish summary: {0}")]
    PublishError(String),

    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    FetchError,
    GenerationError,
    PublishError,
    ConfigurationError,
}

impl PipelineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::FetchError(_) => ErrorKind::FetchError,
            PipelineError::GenerationError(_) => ErrorKind::GenerationError,
            PipelineError::PublishError(_) => ErrorKind::PublishError,
            PipelineError::ConfigurationError(_) => ErrorKind::ConfigurationError,
        }
    }

    /// The bare message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            PipelineError::FetchError(m)
            | PipelineError::GenerationError(m)
            | PipelineError::PublishError(m)
            | PipelineError::ConfigurationError(m) => m,
        }
    }
}

impl From<LlmError> for PipelineError {
    fn from(error: LlmError) -> Self {
        PipelineError::GenerationError(error.to_string())
    }
}
