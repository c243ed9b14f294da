use std::collections::HashMap;
use std::time::Duration;

use chrono_tz::Tz;
use standup_digest::core::config::{AppConfig, DEFAULT_MODEL, DEFAULT_SUMMARY_BUDGET};
use standup_digest::errors::{ErrorKind, PipelineError};

fn load(vars: &[(&str, &str)]) -> Result<AppConfig, PipelineError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

const BASE: [(&str, &str); 3] = [
    ("SLACK_CHANNEL_ID", "C0STANDUP"),
    ("SLACK_BOT_TOKEN_SECRET_ARN", "/standup/slack-bot-token"),
    ("OPENAI_API_KEY", "sk-test"),
];

fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
    let mut vars = BASE.to_vec();
    vars.extend_from_slice(extra);
    vars
}

fn config_error(result: Result<AppConfig, PipelineError>) -> String {
    match result {
        Err(e) => {
            assert_eq!(e.kind(), ErrorKind::ConfigurationError);
            e.message().to_string()
        }
        Ok(config) => panic!("expected a configuration error, got {config:?}"),
    }
}

#[test]
fn test_defaults() {
    let config = load(&BASE).unwrap();

    assert_eq!(config.channel_id, "C0STANDUP");
    assert_eq!(
        config.token_secret_reference.as_deref(),
        Some("/standup/slack-bot-token")
    );
    assert_eq!(config.summary_budget, DEFAULT_SUMMARY_BUDGET);
    assert_eq!(config.model_identifier, DEFAULT_MODEL);
    assert_eq!(config.model_timeout, Duration::from_secs(60));
    assert_eq!(config.generation_retries, 0);
    assert_eq!(config.timezone, Tz::UTC);
    assert!(config.openai_org_id.is_none());
}

#[test]
fn test_overrides() {
    let config = load(&with(&[
        ("SUMMARY_BUDGET", "500"),
        ("MODEL_ID", "gpt-4o-mini"),
        ("MODEL_TIMEOUT_SECS", "15"),
        ("GENERATION_RETRIES", "1"),
        ("SUMMARY_TIMEZONE", "Europe/Berlin"),
        ("OPENAI_ORG_ID", "org-123"),
    ]))
    .unwrap();

    assert_eq!(config.summary_budget, 500);
    assert_eq!(config.model_identifier, "gpt-4o-mini");
    assert_eq!(config.model_timeout, Duration::from_secs(15));
    assert_eq!(config.generation_retries, 1);
    assert_eq!(config.timezone, Tz::Europe__Berlin);
    assert_eq!(config.openai_org_id.as_deref(), Some("org-123"));
}

#[test]
fn test_openai_model_is_a_fallback_for_model_id() {
    let config = load(&with(&[("OPENAI_MODEL", "gpt-4.1")])).unwrap();
    assert_eq!(config.model_identifier, "gpt-4.1");

    let config = load(&with(&[("OPENAI_MODEL", "gpt-4.1"), ("MODEL_ID", "gpt-5-mini")])).unwrap();
    assert_eq!(config.model_identifier, "gpt-5-mini");
}

#[test]
fn test_direct_token_replaces_secret_reference() {
    let config = load(&[
        ("SLACK_CHANNEL_ID", "C0STANDUP"),
        ("SLACK_BOT_TOKEN", "xoxb-test"),
        ("OPENAI_API_KEY", "sk-test"),
    ])
    .unwrap();

    assert!(config.token_secret_reference.is_none());
}

#[test]
fn test_missing_required_values() {
    let message = config_error(load(&[
        ("SLACK_BOT_TOKEN_SECRET_ARN", "/standup/slack-bot-token"),
        ("OPENAI_API_KEY", "sk-test"),
    ]));
    assert!(message.contains("SLACK_CHANNEL_ID"));

    let message = config_error(load(&[
        ("SLACK_CHANNEL_ID", "C0STANDUP"),
        ("OPENAI_API_KEY", "sk-test"),
    ]));
    assert!(message.contains("SLACK_BOT_TOKEN_SECRET_ARN"));

    let message = config_error(load(&BASE[..2]));
    assert!(message.contains("OPENAI_API_KEY"));
}

#[test]
fn test_invalid_values_are_rejected() {
    let message = config_error(load(&[
        ("SLACK_CHANNEL_ID", "general"),
        ("SLACK_BOT_TOKEN_SECRET_ARN", "/standup/slack-bot-token"),
        ("OPENAI_API_KEY", "sk-test"),
    ]));
    assert!(message.contains("SLACK_CHANNEL_ID"));

    for (key, value) in [
        ("SUMMARY_BUDGET", "0"),
        ("SUMMARY_BUDGET", "lots"),
        ("MODEL_TIMEOUT_SECS", "-5"),
        ("GENERATION_RETRIES", "2"),
        ("MODEL_ID", "gpt 5"),
        ("SUMMARY_TIMEZONE", "Mars/Olympus"),
    ] {
        let message = config_error(load(&with(&[(key, value)])));
        assert!(message.starts_with(key), "{key}={value} gave {message}");
    }
}

#[test]
fn test_blank_values_count_as_unset() {
    let config = load(&with(&[("SUMMARY_BUDGET", "  "), ("OPENAI_ORG_ID", "")])).unwrap();
    assert_eq!(config.summary_budget, DEFAULT_SUMMARY_BUDGET);
    assert!(config.openai_org_id.is_none());
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_large_budget_is_kept_exactly() {
    let config = load(&with(&[("SUMMARY_BUDGET", "18446744073709551615")])).unwrap();
    assert_eq!(config.summary_budget, usize::MAX);
}

#[test]
#[cfg(target_pointer_width = "32")]
fn test_budget_beyond_word_size_is_rejected() {
    let message = config_error(load(&with(&[("SUMMARY_BUDGET", "4294967296")])));
    assert!(message.starts_with("SUMMARY_BUDGET"), "{message}");
}
