//! Credit ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use serde_json::json;

use shelfshare_db::CreditRepository;
use shelfshare_shared::types::PageRequest;

use crate::AppState;

use super::error_response;

/// Creates the credit ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/credits", get(list_user_credits))
        .route("/users/{user_id}/credits/audit", get(audit_user_credits))
}

/// GET `/users/{user_id}/credits` - A user's postings, newest first.
async fn list_user_credits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = CreditRepository::new((*state.db).clone());

    match repo.history(user_id, &page).await {
        Ok(history) => (StatusCode::OK, Json(history)).into_response(),
        Err(e) => error_response(&e, "list user credits"),
    }
}

/// GET `/users/{user_id}/credits/audit` - Replays the full log from zero
/// and checks it against the stored balance.
async fn audit_user_credits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CreditRepository::new((*state.db).clone());

    match repo.verify_ledger(user_id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({
                "user_id": user_id,
                "balance": balance,
                "consistent": true,
            })),
        )
            .into_response(),
        Err(e) => error_response(&e, "audit user credits"),
    }
}
