//! Reservation queue errors.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by queue operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// No reservation with this id.
    #[error("reservation not found: {0}")]
    ReservationNotFound(Uuid),

    /// The book is on the shelf; request it instead of queueing.
    #[error("book is currently available and can be requested directly")]
    BookAvailable,

    /// The user already holds a live entry in this book's queue.
    #[error("an active reservation for this book already exists")]
    DuplicateReservation,

    /// Suspended or blocked accounts may not join queues.
    #[error("account status does not permit reservations")]
    AccountRestricted,

    /// The entry has already reached a terminal state.
    #[error("reservation has already been processed")]
    AlreadyProcessed,

    /// Confirmation only applies to the notified head.
    #[error("reservation has not been notified")]
    NotNotified,

    /// The confirmation window elapsed before the claim.
    #[error("confirmation window has expired")]
    ReservationExpired,
}

impl ReservationError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
            Self::BookAvailable => "BOOK_AVAILABLE",
            Self::DuplicateReservation => "DUPLICATE_RESERVATION",
            Self::AccountRestricted => "ACCOUNT_RESTRICTED",
            Self::AlreadyProcessed => "RESERVATION_ALREADY_PROCESSED",
            Self::NotNotified => "RESERVATION_NOT_NOTIFIED",
            Self::ReservationExpired => "RESERVATION_EXPIRED",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ReservationNotFound(_) => 404,
            Self::AccountRestricted => 403,
            _ => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ReservationError::ReservationNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(ReservationError::AccountRestricted.http_status_code(), 403);
        assert_eq!(ReservationError::BookAvailable.http_status_code(), 422);
        assert_eq!(ReservationError::ReservationExpired.http_status_code(), 422);
    }
}
