use axum::{
    extract::{Query, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
};

/// Handler for `POST /recommendations`
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    run(&state, request_id, request.title).await
}

/// Handler for `GET /recommendations?title=...`
pub async fn recommend_query(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(request): Query<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    run(&state, request_id, request.title).await
}

async fn run(
    state: &AppState,
    request_id: RequestId,
    title: String,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        title = %title,
        "Processing recommendation request"
    );

    let recommendations = state.recommender()?.recommend(&title).await.map_err(|e| {
        if matches!(e, AppError::TitleNotFound(_)) {
            tracing::info!(request_id = %request_id, title = %title, "Title not in catalog");
        }
        e
    })?;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendations completed"
    );

    Ok(Json(RecommendationResponse {
        selected: title,
        recommendations,
    }))
}
