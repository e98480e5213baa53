use std::sync::Arc;

use movie_mate::{
    config::Config,
    create_router,
    services::{bootstrap, providers, RecommendationService},
    similarity::SimilarityIndex,
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // Metadata enrichment is optional; without a key every entry uses the placeholder
    let provider = match providers::provider_from_config(&config) {
        Ok(provider) => {
            tracing::info!(provider = provider.name(), "Metadata provider configured");
            Some(provider)
        }
        Err(e) => {
            tracing::error!(error = %e, "Metadata enrichment disabled");
            None
        }
    };

    let loaded = match bootstrap::ensure_data_files(&config).await {
        Ok(()) => SimilarityIndex::load(&config.catalog_path, &config.similarity_path),
        Err(e) => Err(e),
    };

    let state = match loaded {
        Ok(index) => AppState::ready(RecommendationService::new(Arc::new(index), provider)),
        Err(e) => {
            tracing::error!(error = %e, "Movie data unavailable, serving errors until restart");
            AppState::unavailable(e)
        }
    };

    let app = create_router(Arc::new(state));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
