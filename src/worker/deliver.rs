use chrono::NaiveDate;
use std::time::Duration;
use tracing::{error, info};

use crate::core::capabilities::MessagePoster;
use crate::core::models::{PublishReceipt, SummaryResult};
use crate::errors::PipelineError;
use crate::slack::message_formatter::format_summary_message;
use crate::utils::retry::{Backoff, RetryOn, RetryPolicy, retry};

pub const PUBLISH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// One post plus a single retry on transient platform failures.
pub const PUBLISH_RETRY_POLICY: RetryPolicy = RetryPolicy {
    max_attempts: 2,
    retry_on: RetryOn::TransientOrThrottled,
    backoff: Backoff::Fixed(PUBLISH_RETRY_DELAY),
};

/// Posts the summary or the no-activity notice back to the channel.
pub struct Publisher<'a> {
    poster: &'a dyn MessagePoster,
}

impl<'a> Publisher<'a> {
    #[must_use]
    pub fn new(poster: &'a dyn MessagePoster) -> Self {
        Self { poster }
    }

    /// # Errors
    ///
    /// Returns `PublishError` when the post fails terminally or fails again after the retry.
    pub async fn publish(
        &self,
        channel_id: &str,
        date: NaiveDate,
        result: &SummaryResult,
    ) -> Result<PublishReceipt, PipelineError> {
        let text = format_summary_message(channel_id, date, result);

        match retry(&PUBLISH_RETRY_POLICY, "chat.postMessage", || {
            self.poster.post_message(channel_id, &text)
        })
        .await
        {
            Ok(receipt) => {
                info!("Posted message {} to channel {}", receipt.ts, receipt.channel_id);
                Ok(receipt)
            }
            Err(e) => {
                error!("Failed to post to channel {}: {}", channel_id, e);
                Err(PipelineError::PublishError(e.to_string()))
            }
        }
    }
}
