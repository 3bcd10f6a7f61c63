//! patseed: seed a fresh SQLite file with merged mock patients.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use patseed::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if config.mock_api_key.is_none() {
        tracing::warn!("MOCK_API_KEY not set, mock source may reject requests");
    }
    tracing::info!(
        samples = config.sample_count,
        max_attempts = config.max_fetch_attempts,
        output_dir = %config.output_dir.display(),
        "Starting import"
    );

    match patseed::run(&config).await {
        Ok(summary) => {
            tracing::info!(
                run_id = %summary.run_id,
                rows = summary.rows,
                output = %summary.output.display(),
                "Import complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Import failed");
            ExitCode::FAILURE
        }
    }
}
