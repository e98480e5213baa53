use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;

/// Failures while loading the catalog or similarity matrix
#[derive(thiserror::Error, Debug)]
pub enum DataLoadError {
    #[error("Data file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Similarity matrix is not square: row {row} has {found} columns, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Catalog has {catalog} movies but similarity matrix has {matrix} rows")]
    DimensionMismatch { catalog: usize, matrix: usize },

    #[error("Failed to download {}: {reason}", .path.display())]
    Download { path: PathBuf, reason: String },
}

/// Row index outside the similarity matrix
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Index {index} is out of range for a catalog of {len} movies")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Movie not found: {0}")]
    TitleNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<IndexOutOfRange> for AppError {
    fn from(err: IndexOutOfRange) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::TitleNotFound(title) => (
                StatusCode::NOT_FOUND,
                format!(
                    "Movie '{}' not found. Please select from the available movies.",
                    title
                ),
            ),
            AppError::DataLoad(_) | AppError::Unavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::Configuration(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_not_found_is_404() {
        let response = AppError::TitleNotFound("Unknown Movie".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_data_load_is_503() {
        let err = DataLoadError::DimensionMismatch {
            catalog: 3,
            matrix: 2,
        };
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_index_out_of_range_message() {
        let err = IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "Index 7 is out of range for a catalog of 3 movies"
        );
    }
}
