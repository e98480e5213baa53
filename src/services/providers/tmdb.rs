/// TMDb metadata provider
///
/// Searches TMDb by title and takes the first result. The result's poster
/// path is expanded into a full image URL using the configured image base URL.
///
/// API Flow:
/// 1. Title Search: /search/movie?query=... → list of matching movies
/// 2. Poster: {image_base_url}/w500{poster_path}
use crate::{
    models::{MovieMetadata, TmdbSearchResponse},
    services::providers::{FetchError, MetadataProvider, DEFAULT_RATING},
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const POSTER_SIZE: &str = "w500";
const SEARCH_LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base_url: String,
}

impl TmdbProvider {
    /// Creates a TMDb provider whose requests give up after `timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        image_base_url: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Expands a TMDb poster path into a displayable URL
    fn poster_url(&self, poster_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.image_base_url,
            POSTER_SIZE,
            poster_path.trim_start_matches('/')
        )
    }
}

/// Removes a trailing release year such as " (1995)" from a title
pub fn strip_year_suffix(title: &str) -> &str {
    let trimmed = title.trim();

    if let Some(rest) = trimmed.strip_suffix(')') {
        if let Some(open) = rest.rfind('(') {
            let year = &rest[open + 1..];
            if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
                return trimmed[..open].trim_end();
            }
        }
    }

    trimmed
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch(&self, title: &str) -> Result<MovieMetadata, FetchError> {
        let query = strip_year_suffix(title);
        let url = format!("{}/search/movie", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("language", SEARCH_LANGUAGE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let search: TmdbSearchResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        // First result wins, no matching against the local title or year
        let movie = search
            .results
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NoResults(query.to_string()))?;

        let poster_path = movie
            .poster_path
            .filter(|path| !path.trim().is_empty())
            .ok_or_else(|| FetchError::MissingPoster(query.to_string()))?;

        tracing::debug!(
            query = %query,
            tmdb_id = movie.id,
            provider = "tmdb",
            "Metadata fetched"
        );

        Ok(MovieMetadata {
            poster_url: self.poster_url(&poster_path),
            rating: movie.vote_average.unwrap_or(DEFAULT_RATING),
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
