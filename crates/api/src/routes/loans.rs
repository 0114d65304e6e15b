//! Loan routes: listings, renewal, return.

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

use shelfshare_db::repositories::loan::{ProcessReturnInput, RenewLoanInput};
use shelfshare_db::LoanRepository;
use shelfshare_shared::types::PageRequest;

use crate::AppState;

use super::error_response;

/// Creates the loan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans))
        .route("/users/{user_id}/loans", get(list_user_loans))
        .route("/loans/{loan_id}/renew", post(renew_loan))
        .route("/loans/{loan_id}/return", post(return_loan))
}

/// Request body for renewing a loan.
#[derive(Debug, Deserialize)]
pub struct RenewBody {
    /// The borrower, or an administrator renewing on their behalf.
    pub actor_id: Uuid,
}

/// Request body for processing a return.
#[derive(Debug, Deserialize)]
pub struct ReturnBody {
    /// Administrator receiving the book.
    pub admin_id: Uuid,
    /// Grade assigned at the return desk.
    pub condition: String,
    /// Notes when the book came back damaged.
    pub damage_notes: Option<String>,
}

/// GET `/loans` - List all loans, newest first.
async fn list_loans(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    match repo.list(&page).await {
        Ok(loans) => (StatusCode::OK, Json(loans)).into_response(),
        Err(e) => error_response(&e, "list loans"),
    }
}

/// GET `/users/{user_id}/loans` - List one user's loans.
async fn list_user_loans(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    match repo.list_for_user(user_id, &page).await {
        Ok(loans) => (StatusCode::OK, Json(loans)).into_response(),
        Err(e) => error_response(&e, "list user loans"),
    }
}

/// POST `/loans/{loan_id}/renew` - Renew a loan.
async fn renew_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<Uuid>,
    Json(body): Json<RenewBody>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    let input = RenewLoanInput {
        loan_id,
        actor_id: body.actor_id,
    };

    match repo.renew(input).await {
        Ok(loan) => (StatusCode::OK, Json(json!({ "loan": loan }))).into_response(),
        Err(e) => error_response(&e, "renew loan"),
    }
}

/// POST `/loans/{loan_id}/return` - Process a return.
async fn return_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<Uuid>,
    Json(body): Json<ReturnBody>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());

    let input = ProcessReturnInput {
        loan_id,
        admin_id: body.admin_id,
        condition: body.condition,
        damage_notes: body.damage_notes,
    };

    match repo.process_return(input).await {
        Ok(loan) => (StatusCode::OK, Json(json!({ "loan": loan }))).into_response(),
        Err(e) => error_response(&e, "process return"),
    }
}
