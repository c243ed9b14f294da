#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use standup_digest::core::capabilities::{ChannelHistory, MessagePoster, SummaryModel};
use standup_digest::core::config::AppConfig;
use standup_digest::core::models::{
    HistoryPage, PublishReceipt, RawMessage, TimeWindow, parse_slack_ts,
};
use standup_digest::errors::{LlmError, SlackError};

pub const CHANNEL: &str = "C0STANDUP";

/// 2023-11-15T22:13:20Z
pub fn now() -> DateTime<Utc> {
    parse_slack_ts("1700086400").unwrap()
}

pub fn test_config() -> AppConfig {
    config_with(&[])
}

pub fn config_with(overrides: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("SLACK_CHANNEL_ID", CHANNEL),
        ("SLACK_BOT_TOKEN_SECRET_ARN", "/standup/slack-bot-token"),
        ("OPENAI_API_KEY", "sk-test"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert((*k).to_string(), (*v).to_string());
    }
    AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// A user message `secs_ago` seconds before [`now`].
pub fn user_msg(secs_ago: i64, text: &str) -> RawMessage {
    let ts = format!("{}.000100", now().timestamp() - secs_ago);
    RawMessage {
        timestamp: parse_slack_ts(&ts).unwrap(),
        ts,
        author_id: "U1".to_string(),
        text: text.to_string(),
        thread_parent_id: None,
        is_bot: false,
        is_edited: false,
        subtype: None,
    }
}

pub fn bot_msg(secs_ago: i64, text: &str) -> RawMessage {
    RawMessage {
        author_id: "B1".to_string(),
        is_bot: true,
        subtype: Some("bot_message".to_string()),
        ..user_msg(secs_ago, text)
    }
}

pub fn page(messages: Vec<RawMessage>, next_cursor: Option<&str>) -> HistoryPage {
    HistoryPage {
        messages,
        next_cursor: next_cursor.map(str::to_string),
    }
}

pub fn rate_limited() -> SlackError {
    SlackError::RateLimited {
        retry_after: Some(Duration::from_secs(5)),
    }
}

/// Serves scripted history pages in order; an exhausted script yields an empty page.
#[derive(Default)]
pub struct FakeHistory {
    script: Mutex<VecDeque<Result<HistoryPage, SlackError>>>,
    pub cursors: Mutex<Vec<Option<String>>>,
    pub calls: AtomicUsize,
}

impl FakeHistory {
    pub fn new(script: Vec<Result<HistoryPage, SlackError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn single_page(messages: Vec<RawMessage>) -> Self {
        Self::new(vec![Ok(page(messages, None))])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelHistory for FakeHistory {
    async fn history_page(
        &self,
        _channel_id: &str,
        _window: &TimeWindow,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, SlackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cursors
            .lock()
            .unwrap()
            .push(cursor.map(str::to_string));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HistoryPage::default()))
    }
}

/// Records every post; scripted failures are consumed first.
#[derive(Default)]
pub struct FakePoster {
    failures: Mutex<VecDeque<SlackError>>,
    pub posted: Mutex<Vec<(String, String)>>,
    pub attempts: AtomicUsize,
}

impl FakePoster {
    pub fn failing_with(failures: Vec<SlackError>) -> Self {
        Self {
            failures: Mutex::new(failures.into()),
            ..Self::default()
        }
    }

    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessagePoster for FakePoster {
    async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
    ) -> Result<PublishReceipt, SlackError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let mut posted = self.posted.lock().unwrap();
        posted.push((channel_id.to_string(), text.to_string()));
        Ok(PublishReceipt {
            channel_id: channel_id.to_string(),
            ts: format!("1700086401.{:06}", posted.len()),
        })
    }
}

/// Replies with scripted results, optionally after a delay; records prompt text.
#[derive(Default)]
pub struct FakeModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        Self::scripted(vec![Ok(reply.to_string())])
    }

    pub fn scripted(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            delay: Some(Duration::from_secs(3600)),
            ..Self::replying("- too late")
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SummaryModel for FakeModel {
    async fn complete(&self, prompt: &[ChatCompletionMessage]) -> Result<String, LlmError> {
        let text = prompt
            .iter()
            .filter_map(|m| match &m.content {
                Content::Text(t) => Some(t.clone()),
                Content::ImageUrl(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(text);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::EmptyResponse))
    }
}
