use chrono::NaiveDate;
use chrono_tz::Tz;
use std::time::Duration;
use tracing::{info, warn};

use crate::ai::{ParsedResponse, RetrievalContext, SUMMARY_BULLETS, build_prompt, parse_summary_response};
use crate::core::capabilities::SummaryModel;
use crate::core::models::SummaryResult;
use crate::errors::{LlmError, PipelineError};
use crate::utils::retry::{Backoff, RetryOn, RetryPolicy, retry};

/// Base delay for the optional generation retry; jittered per attempt.
pub const GENERATION_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Turns a retrieval context into at most five bullets via the hosted model.
pub struct SummaryGenerator<'a> {
    model: &'a dyn SummaryModel,
    timeout: Duration,
    policy: RetryPolicy,
}

impl<'a> SummaryGenerator<'a> {
    /// `retries` is the number of extra attempts after a transient failure (0 or 1).
    #[must_use]
    pub fn new(model: &'a dyn SummaryModel, timeout: Duration, retries: u32) -> Self {
        Self {
            model,
            timeout,
            policy: RetryPolicy {
                max_attempts: 1 + retries.min(1),
                retry_on: RetryOn::TransientOnly,
                backoff: Backoff::Jittered(GENERATION_RETRY_BASE_DELAY),
            },
        }
    }

    /// # Errors
    ///
    /// Returns `GenerationError` when the model call fails, times out, or the
    /// reply contains no usable bullet lines.
    pub async fn generate(
        &self,
        context: &RetrievalContext,
        channel_id: &str,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<SummaryResult, PipelineError> {
        let RetrievalContext::Assembled(assembled) = context else {
            return Ok(SummaryResult::NoActivity);
        };

        let prompt = build_prompt(assembled, channel_id, date, tz);
        let raw = retry(&self.policy, "model invocation", || async {
            tokio::time::timeout(self.timeout, self.model.complete(&prompt))
                .await
                .unwrap_or(Err(LlmError::Timeout(self.timeout)))
        })
        .await?;

        match parse_summary_response(&raw) {
            ParsedResponse::Parsed(mut bullets) => {
                if bullets.len() != SUMMARY_BULLETS {
                    warn!(
                        "Model returned {} bullets instead of {}",
                        bullets.len(),
                        SUMMARY_BULLETS
                    );
                    bullets.truncate(SUMMARY_BULLETS);
                }
                info!("Generated summary with {} bullets", bullets.len());
                Ok(SummaryResult::Summary { bullets })
            }
            ParsedResponse::Malformed(raw) => Err(PipelineError::GenerationError(format!(
                "model reply had no usable bullet lines ({} chars)",
                raw.chars().count()
            ))),
        }
    }
}
