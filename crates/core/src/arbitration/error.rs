//! Arbitration errors.
//!
//! The `Display` text of standing violations doubles as the generated
//! rejection reason persisted on the request.

use thiserror::Error;
use uuid::Uuid;

/// Reasons an approval is denied or a manual decision is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArbitrationError {
    /// No request with this id.
    #[error("loan request not found: {0}")]
    RequestNotFound(Uuid),

    /// The request was already decided.
    #[error("request is no longer pending")]
    RequestNotPending,

    /// Another approval won the race for this book.
    #[error("book is already on loan")]
    BookAlreadyOnLoan,

    /// The availability flag is down.
    #[error("book is not available")]
    BookUnavailable,

    /// Warning-band accounts may hold at most one open loan.
    #[error("account in warning standing already holds an open loan")]
    WarningLoanLimit,

    /// Suspended accounts cannot borrow.
    #[error("account is suspended due to negative credit balance")]
    AccountSuspended,

    /// Blocked accounts cannot borrow.
    #[error("account is blocked due to severely negative credit balance")]
    AccountBlocked,

    /// Manual rejections must carry a reason.
    #[error("rejection reason must not be empty")]
    EmptyRejectionReason,
}

impl ArbitrationError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::RequestNotPending => "REQUEST_NOT_PENDING",
            Self::BookAlreadyOnLoan => "BOOK_ALREADY_ON_LOAN",
            Self::BookUnavailable => "BOOK_UNAVAILABLE",
            Self::WarningLoanLimit => "WARNING_LOAN_LIMIT",
            Self::AccountSuspended => "ACCOUNT_SUSPENDED",
            Self::AccountBlocked => "ACCOUNT_BLOCKED",
            Self::EmptyRejectionReason => "EMPTY_REJECTION_REASON",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::RequestNotFound(_) => 404,
            Self::EmptyRejectionReason => 400,
            Self::WarningLoanLimit | Self::AccountSuspended | Self::AccountBlocked => 403,
            _ => 422,
        }
    }

    /// Whether this denial terminally rejects the request.
    ///
    /// Standing violations reject; stale-state failures leave the request
    /// pending so it can be retried once the state settles.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::WarningLoanLimit | Self::AccountSuspended | Self::AccountBlocked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminality() {
        assert!(ArbitrationError::WarningLoanLimit.is_terminal());
        assert!(ArbitrationError::AccountSuspended.is_terminal());
        assert!(ArbitrationError::AccountBlocked.is_terminal());
        assert!(!ArbitrationError::RequestNotPending.is_terminal());
        assert!(!ArbitrationError::BookAlreadyOnLoan.is_terminal());
        assert!(!ArbitrationError::BookUnavailable.is_terminal());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ArbitrationError::RequestNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(ArbitrationError::AccountBlocked.http_status_code(), 403);
        assert_eq!(ArbitrationError::RequestNotPending.http_status_code(), 422);
        assert_eq!(
            ArbitrationError::EmptyRejectionReason.http_status_code(),
            400
        );
    }
}
