//! Reservation routes: enqueue, listings, cancel, confirm.

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

use shelfshare_db::ReservationRepository;
use shelfshare_shared::types::PageRequest;

use crate::AppState;

use super::error_response;

/// Creates the reservation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books/{book_id}/reservations", post(create_reservation))
        .route("/users/{user_id}/reservations", get(list_user_reservations))
        .route("/reservations/{reservation_id}/cancel", post(cancel_reservation))
        .route("/reservations/{reservation_id}/confirm", post(confirm_reservation))
}

/// Request body naming the acting user; there is no ambient session.
#[derive(Debug, Deserialize)]
pub struct ActorBody {
    /// The reserver.
    pub user_id: Uuid,
}

/// POST `/books/{book_id}/reservations` - Join a book's queue.
async fn create_reservation(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Json(body): Json<ActorBody>,
) -> impl IntoResponse {
    let repo = ReservationRepository::new((*state.db).clone());

    match repo.enqueue(book_id, body.user_id).await {
        Ok(reservation) => {
            (StatusCode::CREATED, Json(json!({ "reservation": reservation }))).into_response()
        }
        Err(e) => error_response(&e, "create reservation"),
    }
}

/// GET `/users/{user_id}/reservations` - List one user's reservations.
async fn list_user_reservations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = ReservationRepository::new((*state.db).clone());

    match repo.list_for_user(user_id, &page).await {
        Ok(reservations) => (StatusCode::OK, Json(reservations)).into_response(),
        Err(e) => error_response(&e, "list user reservations"),
    }
}

/// POST `/reservations/{reservation_id}/cancel` - Cancel a live entry.
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
    Json(body): Json<ActorBody>,
) -> impl IntoResponse {
    let repo = ReservationRepository::new((*state.db).clone());

    match repo.cancel(reservation_id, body.user_id).await {
        Ok(reservation) => {
            (StatusCode::OK, Json(json!({ "reservation": reservation }))).into_response()
        }
        Err(e) => error_response(&e, "cancel reservation"),
    }
}

/// POST `/reservations/{reservation_id}/confirm` - Claim a notified entry.
async fn confirm_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
    Json(body): Json<ActorBody>,
) -> impl IntoResponse {
    let repo = ReservationRepository::new((*state.db).clone());

    match repo.confirm(reservation_id, body.user_id).await {
        Ok((reservation, request)) => (
            StatusCode::OK,
            Json(json!({
                "reservation": reservation,
                "request": request,
            })),
        )
            .into_response(),
        Err(e) => error_response(&e, "confirm reservation"),
    }
}
