use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use tracing::info;

use super::capabilities::CredentialProvider;
use crate::errors::PipelineError;

/// Key looked up when the stored secret is a JSON object.
pub const SLACK_BOT_TOKEN_KEY: &str = "SLACK_BOT_TOKEN";

/// Bearer token for the chat platform. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(token)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(<redacted>)")
    }
}

/// Accepts either a bare token or a JSON object carrying `SLACK_BOT_TOKEN`.
///
/// # Errors
///
/// Returns a configuration error when no token can be extracted.
pub fn token_from_secret_value(value: &str) -> Result<BotToken, PipelineError> {
    let trimmed = value.trim();
    if trimmed.starts_with('{') {
        let parsed: Value = serde_json::from_str(trimmed).map_err(|e| {
            PipelineError::ConfigurationError(format!("secret is not valid JSON: {e}"))
        })?;
        return parsed
            .get(SLACK_BOT_TOKEN_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| BotToken::new(t.to_string()))
            .ok_or_else(|| {
                PipelineError::ConfigurationError(format!(
                    "secret has no {SLACK_BOT_TOKEN_KEY} field"
                ))
            });
    }

    if trimmed.is_empty() {
        return Err(PipelineError::ConfigurationError(
            "secret value is empty".to_string(),
        ));
    }
    Ok(BotToken::new(trimmed.to_string()))
}

/// Parameter Store path that passes reads through to Secrets Manager.
pub const SECRETS_MANAGER_REFERENCE_PREFIX: &str = "/aws/reference/secretsmanager/";

/// `arn:<partition>:secretsmanager:<region>:<account>:secret:<name>-<6 random chars>`
static SECRET_ARN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:[^:]+:secretsmanager:[^:]*:[^:]*:secret:(.+?)(?:-[A-Za-z0-9]{6})?$")
        .expect("secret arn regex compiles")
});

/// Map a secret reference onto the Parameter Store name to read.
///
/// Secrets Manager ARNs become the `/aws/reference/secretsmanager/<name>`
/// pass-through path; anything else is already a parameter name.
#[must_use]
pub fn ssm_parameter_name(reference: &str) -> String {
    match SECRET_ARN_RE.captures(reference.trim()) {
        Some(caps) => format!("{SECRETS_MANAGER_REFERENCE_PREFIX}{}", &caps[1]),
        None => reference.to_string(),
    }
}

/// Reads the token from AWS SSM Parameter Store (`SecureString`, decrypted).
pub struct SsmCredentialProvider {
    client: SsmClient,
}

impl SsmCredentialProvider {
    pub async fn from_env() -> Self {
        let shared = aws_config::from_env().load().await;
        Self {
            client: SsmClient::new(&shared),
        }
    }
}

#[async_trait]
impl CredentialProvider for SsmCredentialProvider {
    async fn resolve(&self, reference: &str) -> Result<BotToken, PipelineError> {
        let name = ssm_parameter_name(reference);
        let resp = self
            .client
            .get_parameter()
            .name(&name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                PipelineError::ConfigurationError(format!("ssm get_parameter: {e}"))
            })?;

        let value = resp
            .parameter
            .as_ref()
            .and_then(|p| p.value())
            .ok_or_else(|| {
                PipelineError::ConfigurationError(format!("secret {reference} has no value"))
            })?;

        info!("Resolved Slack bot token from secret reference");
        token_from_secret_value(value)
    }
}

/// Local runs: the token is supplied directly in the environment.
pub struct EnvCredentialProvider {
    token: Option<String>,
}

impl EnvCredentialProvider {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var(SLACK_BOT_TOKEN_KEY).ok())
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn resolve(&self, _reference: &str) -> Result<BotToken, PipelineError> {
        self.token
            .as_deref()
            .ok_or_else(|| {
                PipelineError::ConfigurationError(format!("{SLACK_BOT_TOKEN_KEY} is not set"))
            })
            .and_then(token_from_secret_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_bare_and_json_secret() {
        assert_eq!(
            token_from_secret_value(" xoxb-123 \n").unwrap().expose(),
            "xoxb-123"
        );
        assert_eq!(
            token_from_secret_value(r#"{"SLACK_BOT_TOKEN": "xoxb-456"}"#)
                .unwrap()
                .expose(),
            "xoxb-456"
        );
    }

    #[test]
    fn test_token_from_secret_rejects_missing_values() {
        for bad in ["", "   ", r#"{"OTHER": "x"}"#, r#"{"SLACK_BOT_TOKEN": ""}"#, "{broken"] {
            let err = token_from_secret_value(bad).unwrap_err();
            assert!(matches!(err, PipelineError::ConfigurationError(_)), "{bad}");
        }
    }

    #[test]
    fn test_secret_arn_reads_through_parameter_store() {
        assert_eq!(
            ssm_parameter_name(
                "arn:aws:secretsmanager:us-east-1:123456789012:secret:standup/slack-bot-AbC123"
            ),
            "/aws/reference/secretsmanager/standup/slack-bot"
        );
        assert_eq!(
            ssm_parameter_name("arn:aws-us-gov:secretsmanager:us-gov-west-1:1:secret:slack"),
            "/aws/reference/secretsmanager/slack"
        );
    }

    #[test]
    fn test_parameter_names_pass_through() {
        assert_eq!(ssm_parameter_name("/standup/slack-token"), "/standup/slack-token");
        assert_eq!(
            ssm_parameter_name("arn:aws:ssm:us-east-1:123456789012:parameter/slack"),
            "arn:aws:ssm:us-east-1:123456789012:parameter/slack"
        );
    }

    #[test]
    fn test_bot_token_debug_is_redacted() {
        let token = BotToken::new("xoxb-secret".to_string());
        assert!(!format!("{token:?}").contains("xoxb-secret"));
    }

    #[tokio::test]
    async fn test_env_provider_requires_token() {
        let missing = EnvCredentialProvider::new(None);
        assert!(missing.resolve("ignored").await.is_err());

        let present = EnvCredentialProvider::new(Some("xoxb-local".to_string()));
        assert_eq!(present.resolve("ignored").await.unwrap().expose(), "xoxb-local");
    }
}
