//! Message normalization: decides which history records are worth summarizing
//! and flattens Slack markup into plain text.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::core::models::{NormalizedUnit, RawMessage};

/// Subtypes that are platform bookkeeping rather than conversation.
const SYSTEM_SUBTYPES: &[&str] = &[
    "bot_message",
    "channel_join",
    "channel_leave",
    "channel_topic",
    "channel_purpose",
    "channel_name",
    "channel_archive",
    "channel_unarchive",
    "message_deleted",
    "pinned_item",
    "unpinned_item",
];

static SLACK_ANGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>]+)>").expect("angle markup regex compiles"));

static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[\s(])([*_~]+)([^*_~\s][^*_~]*?)([*_~]+)($|[\s).,!?:;])")
        .expect("emphasis regex compiles")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex compiles"));

/// Turn one history record into a retrievable unit, or drop it.
///
/// Only top-level channel messages survive: bot output, system subtypes,
/// thread replies and messages that are empty once flattened are dropped.
#[must_use]
pub fn normalize(msg: &RawMessage) -> Option<NormalizedUnit> {
    if msg.is_bot || msg.author_id.trim().is_empty() {
        return None;
    }

    if msg
        .subtype
        .as_deref()
        .is_some_and(|s| SYSTEM_SUBTYPES.contains(&s))
    {
        return None;
    }

    if msg
        .thread_parent_id
        .as_deref()
        .is_some_and(|parent| parent != msg.ts)
    {
        return None;
    }

    let text = flatten_slack_markup(&msg.text);
    if text.is_empty() {
        return None;
    }

    Some(NormalizedUnit {
        author_id: msg.author_id.clone(),
        timestamp: msg.timestamp,
        text,
    })
}

/// Normalize a chronological batch, preserving order.
#[must_use]
pub fn normalize_all(messages: &[RawMessage]) -> Vec<NormalizedUnit> {
    messages.iter().filter_map(normalize).collect()
}

/// Flatten Slack `mrkdwn` into plain text suitable for a prompt.
#[must_use]
pub fn flatten_slack_markup(text: &str) -> String {
    let replaced = SLACK_ANGLE_RE.replace_all(text, |caps: &Captures| {
        let inner = &caps[1];
        let (target, label) = match inner.split_once('|') {
            Some((t, l)) => (t, Some(l)),
            None => (inner, None),
        };
        let bare_label = label.map(|l| l.trim_start_matches(['@', '#']));

        if let Some(user) = target.strip_prefix('@') {
            format!("@{}", bare_label.unwrap_or(user))
        } else if let Some(channel) = target.strip_prefix('#') {
            format!("#{}", bare_label.unwrap_or(channel))
        } else if let Some(special) = target.strip_prefix('!') {
            let name = special.split('^').next().unwrap_or(special);
            format!("@{}", bare_label.unwrap_or(name))
        } else {
            match label {
                Some(l) if l != target => format!("{l} ({target})"),
                _ => target.to_string(),
            }
        }
    });

    let unescaped = replaced
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    let without_code = unescaped.replace("```", " ").replace('`', "");
    let without_emphasis = EMPHASIS_RE.replace_all(&without_code, "$1$3$5");

    WHITESPACE_RE
        .replace_all(&without_emphasis, " ")
        .trim()
        .to_string()
}
