/// Movie metadata provider abstraction
///
/// Posters and ratings come from an external API. Each provider resolves a
/// catalog title to display metadata; callers decide what to do on failure.
use reqwest::Url;
use std::sync::Arc;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::MovieMetadata,
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Rating shown when no live rating is available
pub const DEFAULT_RATING: f32 = 7.0;

const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/300x450.png";

/// Why a single metadata lookup produced nothing usable
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("No search results for '{0}'")]
    NoResults(String),

    #[error("No poster available for '{0}'")]
    MissingPoster(String),

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Metadata task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Http(e) if e.is_timeout())
    }
}

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the poster URL and rating for a catalog title
    async fn fetch(&self, title: &str) -> Result<MovieMetadata, FetchError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Deterministic placeholder poster and default rating for a title
pub fn fallback_metadata(title: &str) -> MovieMetadata {
    let poster_url = Url::parse_with_params(PLACEHOLDER_POSTER_URL, &[("text", title)])
        .map(String::from)
        .unwrap_or_else(|_| PLACEHOLDER_POSTER_URL.to_string());

    MovieMetadata {
        poster_url,
        rating: DEFAULT_RATING,
    }
}

/// Builds the configured metadata provider
///
/// A missing API key is a configuration error; callers are expected to log it
/// and continue without enrichment.
pub fn provider_from_config(config: &Config) -> AppResult<Arc<dyn MetadataProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        AppError::Configuration(
            "API_KEY is not set; posters and ratings will use placeholders".to_string(),
        )
    })?;

    let provider = TmdbProvider::new(
        api_key.to_string(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_base_url.clone(),
        config.metadata_timeout(),
    )
    .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Arc::new(provider))
}
