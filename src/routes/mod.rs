use axum::{
    extract::State,
    middleware::from_fn,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::{AppError, AppResult, DataLoadError},
    middleware::{make_span_with_request_id, request_id_middleware},
    models::HealthResponse,
    services::RecommendationService,
};

pub mod movies;
pub mod recommendations;

/// Shared application state
///
/// Holds the recommendation service when the data files loaded, or the load
/// error otherwise so every data route can report it.
pub struct AppState {
    recommender: Result<Arc<RecommendationService>, DataLoadError>,
}

impl AppState {
    pub fn ready(service: RecommendationService) -> Self {
        Self {
            recommender: Ok(Arc::new(service)),
        }
    }

    pub fn unavailable(error: DataLoadError) -> Self {
        Self {
            recommender: Err(error),
        }
    }

    /// Returns the service, or a 503 error describing the failed data load
    pub fn recommender(&self) -> AppResult<Arc<RecommendationService>> {
        self.recommender
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| AppError::Unavailable(format!("Movie data failed to load: {}", e)))
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(movies::list))
        .route(
            "/recommendations",
            get(recommendations::recommend_query).post(recommendations::recommend),
        )
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (data_loaded, metadata_enabled) = match state.recommender() {
        Ok(service) => (true, service.metadata_enabled()),
        Err(_) => (false, false),
    };

    let status = if data_loaded && metadata_enabled {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        data_loaded,
        metadata_enabled,
    })
}
