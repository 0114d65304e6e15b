//! Profile and leaderboard routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use shelfshare_db::ReputationRepository;

use crate::AppState;

use super::error_response;

/// Creates the profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/profile", get(get_profile))
        .route("/rankings", get(get_rankings))
}

/// GET `/users/{user_id}/profile` - Derived reputation profile.
async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ReputationRepository::new((*state.db).clone());

    match repo.profile(user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response(&e, "get profile"),
    }
}

/// GET `/rankings` - The three leaderboards.
async fn get_rankings(State(state): State<AppState>) -> impl IntoResponse {
    let repo = ReputationRepository::new((*state.db).clone());

    match repo.rankings().await {
        Ok(rankings) => (StatusCode::OK, Json(rankings)).into_response(),
        Err(e) => error_response(&e, "get rankings"),
    }
}
