//! All Slack-specific functionality

pub mod client;
pub mod history;
pub mod message_formatter;

// Re-export main types for convenience
pub use client::SlackClient;
pub use history::ChannelHistoryFetcher;
pub use message_formatter::{NO_ACTIVITY_NOTICE, format_summary_message};
