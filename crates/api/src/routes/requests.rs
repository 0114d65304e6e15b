//! Loan request routes: submission, pending list, approve, reject.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use shelfshare_db::RequestRepository;
use shelfshare_shared::types::PageRequest;

use crate::AppState;

use super::error_response;

/// Creates the loan request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books/{book_id}/requests", post(create_request))
        .route("/requests/pending", get(list_pending))
        .route("/requests/{request_id}/approve", post(approve_request))
        .route("/requests/{request_id}/reject", post(reject_request))
}

/// Request body for submitting a loan request. Actor identity is an
/// explicit field; there is no ambient session.
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    /// The student asking for the book.
    pub requester_id: Uuid,
}

/// Request body for approving a request.
#[derive(Debug, Deserialize)]
pub struct ApproveBody {
    /// The deciding administrator.
    pub admin_id: Uuid,
}

/// Request body for rejecting a request.
#[derive(Debug, Deserialize)]
pub struct RejectBody {
    /// The deciding administrator.
    pub admin_id: Uuid,
    /// Reason shown to the requester; must not be blank.
    pub reason: String,
}

/// POST `/books/{book_id}/requests` - Submit a loan request.
async fn create_request(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Json(body): Json<CreateRequestBody>,
) -> impl IntoResponse {
    let repo = RequestRepository::new((*state.db).clone());

    match repo.create(book_id, body.requester_id).await {
        Ok(request) => (StatusCode::CREATED, Json(json!({ "request": request }))).into_response(),
        Err(e) => error_response(&e, "create loan request"),
    }
}

/// GET `/requests/pending` - List pending requests, oldest first.
async fn list_pending(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = RequestRepository::new((*state.db).clone());

    match repo.list_pending(&page).await {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(e) => error_response(&e, "list pending requests"),
    }
}

/// POST `/requests/{request_id}/approve` - Approve a pending request.
async fn approve_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<ApproveBody>,
) -> impl IntoResponse {
    let repo = RequestRepository::new((*state.db).clone());

    match repo.approve(request_id, body.admin_id).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "request": outcome.request,
                "loan": outcome.loan,
            })),
        )
            .into_response(),
        Err(e) => error_response(&e, "approve loan request"),
    }
}

/// POST `/requests/{request_id}/reject` - Reject a pending request.
async fn reject_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> impl IntoResponse {
    let repo = RequestRepository::new((*state.db).clone());

    match repo.reject(request_id, body.admin_id, &body.reason).await {
        Ok(request) => (StatusCode::OK, Json(json!({ "request": request }))).into_response(),
        Err(e) => error_response(&e, "reject loan request"),
    }
}
