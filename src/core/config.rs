use chrono_tz::Tz;
use regex::Regex;
use std::env;
use std::sync::LazyLock;
use std::time::Duration;

use crate::errors::PipelineError;

pub const DEFAULT_SUMMARY_BUDGET: usize = 12_000;
pub const DEFAULT_MODEL: &str = "gpt-5";
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
pub const MAX_GENERATION_RETRIES: u32 = 1;

static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[CGD][A-Z0-9]{2,}$").expect("channel id regex compiles"));

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channel_id: String,
    /// `None` when the token is supplied directly through `SLACK_BOT_TOKEN`.
    pub token_secret_reference: Option<String>,
    pub summary_budget: usize,
    pub model_identifier: String,
    pub openai_api_key: String,
    pub openai_org_id: Option<String>,
    pub model_timeout: Duration,
    pub generation_retries: u32,
    pub timezone: Tz,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns a configuration error when a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a required variable is missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| PipelineError::ConfigurationError(format!("{key} is not set")))
        };

        let channel_id = required("SLACK_CHANNEL_ID")?;
        if !CHANNEL_ID_RE.is_match(&channel_id) {
            return Err(PipelineError::ConfigurationError(format!(
                "SLACK_CHANNEL_ID: {channel_id:?} is not a Slack conversation id"
            )));
        }

        let token_secret_reference = get("SLACK_BOT_TOKEN_SECRET_ARN");
        if token_secret_reference.is_none() && get("SLACK_BOT_TOKEN").is_none() {
            return Err(PipelineError::ConfigurationError(
                "SLACK_BOT_TOKEN_SECRET_ARN is not set".to_string(),
            ));
        }

        let summary_budget = match parse_positive("SUMMARY_BUDGET", get("SUMMARY_BUDGET"))? {
            Some(v) => usize::try_from(v).map_err(|_| {
                PipelineError::ConfigurationError(format!(
                    "SUMMARY_BUDGET must fit in a machine word, got {v}"
                ))
            })?,
            None => DEFAULT_SUMMARY_BUDGET,
        };

        let model_identifier = get("MODEL_ID")
            .or_else(|| get("OPENAI_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model_identifier.chars().any(char::is_whitespace) {
            return Err(PipelineError::ConfigurationError(format!(
                "MODEL_ID: {model_identifier:?} is not a model identifier"
            )));
        }

        let model_timeout = Duration::from_secs(
            parse_positive("MODEL_TIMEOUT_SECS", get("MODEL_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS),
        );

        let generation_retries = match get("GENERATION_RETRIES") {
            None => 0,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n <= MAX_GENERATION_RETRIES => n,
                _ => {
                    return Err(PipelineError::ConfigurationError(format!(
                        "GENERATION_RETRIES: expected 0 or {MAX_GENERATION_RETRIES}, got {raw:?}"
                    )));
                }
            },
        };

        let timezone = match get("SUMMARY_TIMEZONE") {
            None => Tz::UTC,
            Some(name) => name.parse::<Tz>().map_err(|e| {
                PipelineError::ConfigurationError(format!("SUMMARY_TIMEZONE: {e}"))
            })?,
        };

        Ok(Self {
            channel_id,
            token_secret_reference,
            summary_budget,
            model_identifier,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_org_id: get("OPENAI_ORG_ID"),
            model_timeout,
            generation_retries,
            timezone,
        })
    }
}

fn parse_positive(key: &str, raw: Option<String>) -> Result<Option<u64>, PipelineError> {
    raw.map(|v| match v.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PipelineError::ConfigurationError(format!(
            "{key}: expected a positive integer, got {v:?}"
        ))),
    })
    .transpose()
}
