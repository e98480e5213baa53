use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{error::AppResult, models::MovieListResponse, routes::AppState};

/// Handler listing every catalog title, for the selection control
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<MovieListResponse>> {
    let titles = state.recommender()?.titles();

    Ok(Json(MovieListResponse {
        count: titles.len(),
        titles,
    }))
}
