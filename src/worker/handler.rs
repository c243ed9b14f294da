use chrono::{DateTime, Utc};
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{debug, error, info};

use super::pipeline::{Pipeline, RunOutcome};
use crate::ai::LlmClient;
use crate::core::capabilities::CredentialProvider;
use crate::core::config::AppConfig;
use crate::core::credentials::{EnvCredentialProvider, SsmCredentialProvider};
use crate::errors::PipelineError;
use crate::slack::SlackClient;

/// Lambda handler for the scheduled trigger. The event payload carries nothing we use.
///
/// # Errors
///
/// Returns an error naming the failure kind when the run ends in `Failed`.
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<RunOutcome, Error> {
    debug!("Ignoring scheduled event payload: {:?}", event.payload);

    let outcome = run_once(Utc::now()).await;
    match &outcome {
        RunOutcome::Done { .. } => Ok(outcome),
        RunOutcome::Failed { kind, message } => Err(Error::from(format!("{kind:?}: {message}"))),
    }
}

/// Load configuration from the environment and execute a single run.
pub async fn run_once(now: DateTime<Utc>) -> RunOutcome {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Config error: {}", e);
            return RunOutcome::failed(&e);
        }
    };

    let outcome = if config.token_secret_reference.is_some() {
        let provider = SsmCredentialProvider::from_env().await;
        run_with_config(&config, &provider, now).await
    } else {
        let provider = EnvCredentialProvider::from_env();
        run_with_config(&config, &provider, now).await
    };

    info!(
        "Run outcome: {}",
        serde_json::to_string(&outcome).unwrap_or_else(|_| format!("{outcome:?}"))
    );
    outcome
}

/// Resolve credentials, build the platform and model clients, and run the pipeline.
pub async fn run_with_config(
    config: &AppConfig,
    credentials: &dyn CredentialProvider,
    now: DateTime<Utc>,
) -> RunOutcome {
    let reference = config.token_secret_reference.as_deref().unwrap_or_default();
    let token = match credentials.resolve(reference).await {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to resolve Slack bot token: {}", e);
            return RunOutcome::failed(&e);
        }
    };

    let slack = match SlackClient::new(&token) {
        Ok(client) => client,
        Err(e) => {
            return RunOutcome::failed(&PipelineError::ConfigurationError(format!(
                "Slack client: {e}"
            )));
        }
    };

    let llm = match LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_org_id.clone(),
        config.model_identifier.clone(),
        config.model_timeout,
    ) {
        Ok(client) => client,
        Err(e) => {
            return RunOutcome::failed(&PipelineError::ConfigurationError(format!(
                "model client: {e}"
            )));
        }
    };

    let (_run, outcome) = Pipeline::new(config, &slack, &llm, &slack).run(now).await;
    outcome
}

pub use self::function_handler as handler;
