//! Rating routes: submission and per-book listings.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use shelfshare_db::repositories::rating::SubmitRatingInput;
use shelfshare_db::{RatingRepository, ReputationRepository};

use crate::AppState;

use super::error_response;

/// Creates the rating routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans/{loan_id}/ratings", post(submit_rating))
        .route("/books/{book_id}/ratings", get(list_book_ratings))
}

/// Request body for submitting a rating.
#[derive(Debug, Deserialize)]
pub struct SubmitRatingBody {
    /// The borrower submitting the score.
    pub rater_id: Uuid,
    /// `book` or `communication`.
    pub category: String,
    /// 1 to 5 inclusive.
    pub score: i16,
    /// Optional free-text comment.
    pub comment: Option<String>,
}

/// POST `/loans/{loan_id}/ratings` - Rate a completed loan.
async fn submit_rating(
    State(state): State<AppState>,
    Path(loan_id): Path<Uuid>,
    Json(body): Json<SubmitRatingBody>,
) -> impl IntoResponse {
    let repo = RatingRepository::new((*state.db).clone());

    let input = SubmitRatingInput {
        loan_id,
        rater_id: body.rater_id,
        category: body.category,
        score: body.score,
        comment: body.comment,
    };

    match repo.submit(input).await {
        Ok(rating) => (StatusCode::CREATED, Json(json!({ "rating": rating }))).into_response(),
        Err(e) => error_response(&e, "submit rating"),
    }
}

/// GET `/books/{book_id}/ratings` - A book's ratings with its average.
async fn list_book_ratings(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> impl IntoResponse {
    let ratings = RatingRepository::new((*state.db).clone());
    let reputation = ReputationRepository::new((*state.db).clone());

    let summary = match reputation.book_summary(book_id).await {
        Ok(summary) => summary,
        Err(e) => return error_response(&e, "book rating summary"),
    };

    match ratings.for_book(book_id).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(json!({
                "summary": summary,
                "ratings": rows,
            })),
        )
            .into_response(),
        Err(e) => error_response(&e, "list book ratings"),
    }
}
