use chrono::Utc;
use standup_digest::worker::handler::{function_handler, run_once};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    standup_digest::setup_logging();

    // Inside Lambda the scheduler drives invocations; anywhere else we run once.
    if std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        return lambda_runtime::run(lambda_runtime::service_fn(function_handler))
            .await
            .map_err(|e| anyhow::anyhow!(e));
    }

    let outcome = run_once(Utc::now()).await;
    println!("{}", serde_json::to_string(&outcome)?);
    if outcome.is_failed() {
        std::process::exit(1);
    }
    Ok(())
}
