//! Paginated, rate-limit aware channel history retrieval.

use futures::stream::{self, Stream, TryStreamExt};
use std::time::Duration;
use tracing::info;

use crate::core::capabilities::ChannelHistory;
use crate::core::models::{RawMessage, TimeWindow};
use crate::errors::{PipelineError, SlackError};
use crate::utils::retry::{Backoff, RetryOn, RetryPolicy, retry};

/// Attempts per page; the third consecutive rate-limit signal is fatal.
pub const MAX_PAGE_ATTEMPTS: u32 = 3;

/// Longest we will honour a platform-specified backoff.
pub const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

pub const HISTORY_RETRY_POLICY: RetryPolicy = RetryPolicy {
    max_attempts: MAX_PAGE_ATTEMPTS,
    retry_on: RetryOn::ThrottledOnly,
    backoff: Backoff::Hinted {
        fallback: Duration::from_secs(1),
        cap: MAX_RATE_LIMIT_WAIT,
    },
};

enum Cursor {
    Start,
    Next(String),
    Done,
}

pub struct ChannelHistoryFetcher<'a> {
    source: &'a dyn ChannelHistory,
    policy: RetryPolicy,
}

impl<'a> ChannelHistoryFetcher<'a> {
    #[must_use]
    pub fn new(source: &'a dyn ChannelHistory) -> Self {
        Self {
            source,
            policy: HISTORY_RETRY_POLICY,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Lazily request pages until the platform stops returning a cursor or a
    /// page holds nothing inside the window. Each yielded page is restricted
    /// to the window.
    fn pages(
        &'a self,
        channel_id: &'a str,
        window: TimeWindow,
    ) -> impl Stream<Item = Result<Vec<RawMessage>, PipelineError>> + Send + 'a {
        stream::try_unfold(Cursor::Start, move |cursor| async move {
            let cursor = match cursor {
                Cursor::Done => return Ok::<_, PipelineError>(None),
                Cursor::Start => None,
                Cursor::Next(c) => Some(c),
            };

            let page = retry(&self.policy, "conversations.history", || {
                self.source
                    .history_page(channel_id, &window, cursor.as_deref())
            })
            .await
            .map_err(|e| self.fetch_error(&e))?;

            let returned = page.messages.len();
            let messages: Vec<RawMessage> = page
                .messages
                .into_iter()
                .filter(|m| window.contains(m.timestamp))
                .collect();

            let next = match page.next_cursor {
                Some(c) if !messages.is_empty() => Cursor::Next(c),
                _ => Cursor::Done,
            };
            info!(
                "Fetched history page: {} returned, {} in window",
                returned,
                messages.len()
            );

            Ok(Some((messages, next)))
        })
    }

    /// Lazy, oldest-first sequence of the window's messages.
    ///
    /// Nothing is requested until the stream is first polled. The platform
    /// serves pages newest-first, so every page is drained before the first
    /// message is yielded.
    pub fn fetch(
        &'a self,
        channel_id: &'a str,
        window: TimeWindow,
    ) -> impl Stream<Item = Result<RawMessage, PipelineError>> + Send + 'a {
        stream::once(self.fetch_chronological(channel_id, window))
            .map_ok(|messages| stream::iter(messages.into_iter().map(Ok::<_, PipelineError>)))
            .try_flatten()
    }

    /// Drain every page and return the window's messages oldest-first.
    ///
    /// The sort is stable, keeping arrival order for equal timestamps.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when a page cannot be retrieved.
    pub async fn fetch_chronological(
        &'a self,
        channel_id: &'a str,
        window: TimeWindow,
    ) -> Result<Vec<RawMessage>, PipelineError> {
        let pages: Vec<Vec<RawMessage>> = self.pages(channel_id, window).try_collect().await?;
        let mut messages: Vec<RawMessage> = pages.into_iter().flatten().collect();
        messages.sort_by_key(|m| m.timestamp);
        info!("Fetched {} messages in window", messages.len());
        Ok(messages)
    }

    fn fetch_error(&self, error: &SlackError) -> PipelineError {
        match error {
            SlackError::RateLimited { .. } => PipelineError::FetchError(format!(
                "rate limited {} times in a row while reading channel history",
                self.policy.max_attempts
            )),
            other => PipelineError::FetchError(other.to_string()),
        }
    }
}
