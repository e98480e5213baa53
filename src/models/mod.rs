use serde::{Deserialize, Serialize};

pub mod tmdb;

pub use tmdb::{TmdbMovie, TmdbSearchResponse};

/// Stable catalog identifier (the TMDb movie ID)
pub type MovieId = u64;

/// A catalog entry
///
/// `index` is the entry's row and column position in the similarity matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub index: usize,
}

/// Display metadata returned by a metadata provider
#[derive(Debug, Clone, PartialEq)]
pub struct MovieMetadata {
    /// Full poster image URL
    pub poster_url: String,
    /// Rating on a 0-10 scale
    pub rating: f32,
}

/// One ranked recommendation, ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub poster_url: String,
    /// Rating formatted with one decimal place, e.g. "7.0"
    pub rating: String,
    pub score: f32,
}

// ============================================================================
// HTTP API Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub selected: String,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieListResponse {
    pub count: usize,
    pub titles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub data_loaded: bool,
    pub metadata_enabled: bool,
}
