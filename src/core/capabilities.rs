//! Capability seams between the pipeline and its external collaborators.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::ChatCompletionMessage;

use super::credentials::BotToken;
use super::models::{HistoryPage, PublishReceipt, TimeWindow};
use crate::errors::{LlmError, PipelineError, SlackError};

/// Resolves the chat platform bearer token from an opaque secret reference.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<BotToken, PipelineError>;
}

/// "Can list messages in a time range", one page per call.
#[async_trait]
pub trait ChannelHistory: Send + Sync {
    async fn history_page(
        &self,
        channel_id: &str,
        window: &TimeWindow,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, SlackError>;
}

/// "Can post a message".
#[async_trait]
pub trait MessagePoster: Send + Sync {
    async fn post_message(&self, channel_id: &str, text: &str)
    -> Result<PublishReceipt, SlackError>;
}

/// Hosted model: prompt in, generated text out.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn complete(&self, prompt: &[ChatCompletionMessage]) -> Result<String, LlmError>;
}
