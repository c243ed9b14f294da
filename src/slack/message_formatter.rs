//! Rendering of the message posted back to the stand-up channel.

use chrono::NaiveDate;
use std::fmt::Write as _;

use crate::core::models::SummaryResult;

/// Posted verbatim when the window holds no qualifying messages.
pub const NO_ACTIVITY_NOTICE: &str = "No messages in the last 24 hours.";

#[must_use]
pub fn format_summary_header(channel_id: &str, date: NaiveDate) -> String {
    format!("*Stand-up summary for <#{channel_id}> ({}):*", date.format("%Y-%m-%d"))
}

/// Render a summary (or the no-activity notice) as one Slack message.
#[must_use]
pub fn format_summary_message(channel_id: &str, date: NaiveDate, result: &SummaryResult) -> String {
    match result {
        SummaryResult::NoActivity => NO_ACTIVITY_NOTICE.to_string(),
        SummaryResult::Summary { bullets } => {
            let mut out = format_summary_header(channel_id, date);
            for bullet in bullets {
                let _ = write!(out, "\n• {bullet}");
            }
            out
        }
    }
}
