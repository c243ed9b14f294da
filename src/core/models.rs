use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::errors::PipelineError;

/// Half-open `[start, end)` interval of channel history covered by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// # Errors
    ///
    /// Returns an error unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PipelineError> {
        if start >= end {
            return Err(PipelineError::FetchError(format!(
                "invalid time window: {start} is not before {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The 24 hours ending at `end`.
    #[must_use]
    pub fn trailing_day(end: DateTime<Utc>) -> Self {
        Self {
            start: end - Duration::hours(24),
            end,
        }
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// Render a timestamp the way Slack encodes message ids (`"1700000000.000100"`).
#[must_use]
pub fn to_slack_ts(t: DateTime<Utc>) -> String {
    format!("{}.{:06}", t.timestamp(), t.timestamp_subsec_micros())
}

/// Parse a Slack `ts` string into a UTC timestamp.
#[must_use]
pub fn parse_slack_ts(ts: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, "0"));
    let secs: i64 = secs.parse().ok()?;
    if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let nanos: u32 = format!("{frac:0<9}").parse().ok()?;
    Utc.timestamp_opt(secs, nanos).single()
}

/// One platform event as returned by the history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Platform message id, unique within the channel.
    pub ts: String,
    pub author_id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub thread_parent_id: Option<String>,
    pub is_bot: bool,
    pub is_edited: bool,
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUnit {
    pub author_id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl NormalizedUnit {
    /// Length counted against the context budget.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A single page of channel history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryPage {
    pub messages: Vec<RawMessage>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryResult {
    Summary { bullets: Vec<String> },
    NoActivity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub channel_id: String,
    pub ts: String,
}
