/// Standup Digest - a scheduled job that condenses a day of Slack stand-up
/// messages into five bullets and posts them back to the channel.
///
/// Each invocation runs one pipeline:
/// 1. Fetch the last 24 hours of channel history (paginated, rate-limit aware)
/// 2. Normalize and filter messages into retrievable text units
/// 3. Assemble a length-bounded retrieval context (most recent activity wins)
/// 4. Ask the hosted model for five stand-up bullets and validate the reply
/// 5. Post the summary, or a fixed notice when nothing happened
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution, triggered once per day by a schedule
/// - SSM Parameter Store for the Slack bot token
/// - The Slack Web API for history and posting
/// - The `OpenAI` Responses API for generation
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use chrono::Utc;
/// use standup_digest::core::config::AppConfig;
/// use standup_digest::core::credentials::EnvCredentialProvider;
/// use standup_digest::worker::handler::run_with_config;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     standup_digest::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let credentials = EnvCredentialProvider::from_env();
///     let outcome = run_with_config(&config, &credentials, Utc::now()).await;
///     println!("{}", serde_json::to_string(&outcome)?);
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod core;
pub mod errors;
pub mod slack;
pub mod utils;
pub mod worker;

pub use ai::estimate_tokens;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless.
///
/// # Example
///
/// ```
/// standup_digest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
