//! API route definitions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;

use crate::AppState;

pub mod credits;
pub mod health;
pub mod loans;
pub mod profiles;
pub mod ratings;
pub mod requests;
pub mod reservations;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(requests::routes())
        .merge(loans::routes())
        .merge(reservations::routes())
        .merge(credits::routes())
        .merge(ratings::routes())
        .merge(profiles::routes())
}

/// Common surface of the repository error enums, used to translate them
/// into HTTP responses uniformly.
pub(crate) trait ApiError: std::fmt::Display {
    /// Stable machine-readable code.
    fn error_code(&self) -> &'static str;
    /// HTTP status this error maps to.
    fn http_status_code(&self) -> u16;
    /// Whether the caller may retry the same call.
    fn is_retryable(&self) -> bool;
}

macro_rules! impl_api_error {
    ($($ty:ty),+ $(,)?) => {
        $(impl ApiError for $ty {
            fn error_code(&self) -> &'static str {
                Self::error_code(self)
            }
            fn http_status_code(&self) -> u16 {
                Self::http_status_code(self)
            }
            fn is_retryable(&self) -> bool {
                Self::is_retryable(self)
            }
        })+
    };
}

impl_api_error!(
    shelfshare_db::repositories::credit::CreditError,
    shelfshare_db::repositories::loan::LoanRepoError,
    shelfshare_db::repositories::rating::RatingRepoError,
    shelfshare_db::repositories::reputation::ReputationError,
    shelfshare_db::repositories::request::RequestError,
    shelfshare_db::repositories::reservation::ReservationRepoError,
);

/// Translates a repository error into a JSON error response, logging
/// server-side failures.
pub(crate) fn error_response<E: ApiError>(err: &E, context: &str) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!(error = %err, context, "request failed");
        return (
            status,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
            "retryable": err.is_retryable(),
        })),
    )
        .into_response()
}
