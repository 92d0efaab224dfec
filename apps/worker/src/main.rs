use curator_ollama_client::OllamaClient;
use curator_shared_config::log_level_from_env;
use curator_worker::{Config, PlexConnector, Scheduler, TokioSleeper};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first so LOG_LEVEL from .env applies
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level_from_env().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Curator worker");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            e.log();
            std::process::exit(1);
        }
    };

    tracing::info!(
        libraries = ?config.library_names,
        collection = %config.collection_title,
        wait_seconds = config.wait_seconds,
        "Configuration loaded"
    );

    let ollama = OllamaClient::new(config.ollama())?;
    match ollama.has_model().await {
        Ok(true) => tracing::debug!(model = %config.ollama().model, "Model available"),
        Ok(false) => tracing::warn!(
            model = %config.ollama().model,
            "Model is not listed by the server; requests may fail"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not reach the model server"),
    }

    let scheduler = Scheduler::new(
        &config,
        PlexConnector::new(config.plex().clone()),
        ollama,
        TokioSleeper,
    );

    if scheduler.run().await.is_err() {
        // Already logged by the scheduler
        std::process::exit(1);
    }

    Ok(())
}
