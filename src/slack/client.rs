//! Slack API client module
//!
//! Implements the two chat capabilities the pipeline needs: paging through
//! channel history and posting a message. Calls go through a slack-morphism
//! session; its errors are classified so the retry combinator can tell rate
//! limits and server faults from terminal failures.

use async_trait::async_trait;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiConversationsHistoryRequest, SlackMessageEventType,
};
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackCursorId, SlackHistoryMessage,
    SlackMessageContent, SlackTs,
};
use tracing::{debug, warn};

use crate::core::capabilities::{ChannelHistory, MessagePoster};
use crate::core::credentials::BotToken;
use crate::core::models::{
    HistoryPage, PublishReceipt, RawMessage, TimeWindow, parse_slack_ts, to_slack_ts,
};
use crate::errors::SlackError;

/// Messages requested per history page.
pub const HISTORY_PAGE_LIMIT: u16 = 200;

/// Slack API client with error classification
pub struct SlackClient {
    client: SlackHyperClient,
    token: SlackApiToken,
}

impl SlackClient {
    /// # Errors
    ///
    /// Returns an error if the HTTPS connector cannot be constructed.
    pub fn new(token: &BotToken) -> Result<Self, SlackError> {
        let connector = SlackClientHyperConnector::new().map_err(|e| {
            SlackError::HttpError(format!("Failed to create Slack HTTP connector: {e}"))
        })?;

        Ok(Self {
            client: SlackHyperClient::new(connector),
            token: SlackApiToken::new(SlackApiTokenValue::new(token.expose().to_string())),
        })
    }
}

/// Build the `conversations.history` request for one page of the window.
fn history_request(
    channel_id: &str,
    window: &TimeWindow,
    cursor: Option<&str>,
) -> SlackApiConversationsHistoryRequest {
    let request = SlackApiConversationsHistoryRequest::new()
        .with_channel(SlackChannelId(channel_id.to_string()))
        .with_oldest(SlackTs(to_slack_ts(window.start())))
        .with_latest(SlackTs(to_slack_ts(window.end())))
        .with_inclusive(true)
        .with_limit(HISTORY_PAGE_LIMIT);

    match cursor {
        Some(c) => request.with_cursor(SlackCursorId(c.to_string())),
        None => request,
    }
}

/// Wire name of a message subtype, e.g. `channel_join`.
fn subtype_name(subtype: &SlackMessageEventType) -> Option<String> {
    serde_json::to_value(subtype)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
}

/// Map a history record into the pipeline's message type.
fn into_raw(msg: SlackHistoryMessage) -> Option<RawMessage> {
    let ts = msg.origin.ts.0;
    let Some(timestamp) = parse_slack_ts(&ts) else {
        warn!("Skipping history record with unparsable ts {:?}", ts);
        return None;
    };
    let is_bot = msg.sender.bot_id.is_some()
        || matches!(msg.subtype, Some(SlackMessageEventType::BotMessage));

    Some(RawMessage {
        author_id: msg
            .sender
            .user
            .map(|u| u.0)
            .or_else(|| msg.sender.bot_id.map(|b| b.0))
            .unwrap_or_default(),
        timestamp,
        text: msg.content.text.unwrap_or_default(),
        thread_parent_id: msg.origin.thread_ts.map(|t| t.0),
        is_bot,
        is_edited: msg.edited.is_some(),
        subtype: msg.subtype.as_ref().and_then(subtype_name),
        ts,
    })
}

#[async_trait]
impl ChannelHistory for SlackClient {
    async fn history_page(
        &self,
        channel_id: &str,
        window: &TimeWindow,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, SlackError> {
        let session = self.client.open_session(&self.token);
        let request = history_request(channel_id, window, cursor);

        let result = session.conversations_history(&request).await?;

        let next_cursor = result
            .response_metadata
            .and_then(|m| m.next_cursor)
            .map(|c| c.0)
            .filter(|c| !c.is_empty());
        let messages: Vec<RawMessage> = result.messages.into_iter().filter_map(into_raw).collect();

        debug!(
            "conversations.history returned {} messages (more: {})",
            messages.len(),
            next_cursor.is_some()
        );

        Ok(HistoryPage {
            messages,
            next_cursor,
        })
    }
}

#[async_trait]
impl MessagePoster for SlackClient {
    async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
    ) -> Result<PublishReceipt, SlackError> {
        let session = self.client.open_session(&self.token);
        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        )
        .with_unfurl_links(false);

        let posted = session.chat_post_message(&post_req).await?;

        Ok(PublishReceipt {
            channel_id: posted.channel.0,
            ts: posted.ts.0,
        })
    }
}
