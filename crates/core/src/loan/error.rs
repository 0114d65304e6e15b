//! Loan lifecycle error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during loan operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanError {
    /// Loan not found.
    #[error("Loan not found: {0}")]
    LoanNotFound(Uuid),

    /// The book is not available for lending.
    #[error("Book is not available")]
    BookUnavailable,

    /// The book already has a non-completed loan.
    #[error("Book already has an active loan")]
    DuplicateActiveLoan,

    /// The loan is completed and immutable.
    #[error("Loan has already been completed")]
    LoanAlreadyCompleted,

    /// The loan has been renewed the maximum number of times.
    #[error("Renewal limit reached ({max} renewals)", max = super::types::MAX_RENEWALS)]
    RenewalLimitReached,

    /// Other users are waiting for this book.
    #[error("Cannot renew: reservation queue for this book is not empty")]
    QueueNonEmpty,

    /// The borrower cannot cover the renewal cost.
    #[error("Insufficient credits: renewal costs {need}, balance is {have}")]
    InsufficientCredits {
        /// Current balance of the borrower.
        have: i32,
        /// Credits the renewal would cost.
        need: i32,
    },
}

impl LoanError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LoanNotFound(_) => "LOAN_NOT_FOUND",
            Self::BookUnavailable => "BOOK_UNAVAILABLE",
            Self::DuplicateActiveLoan => "DUPLICATE_ACTIVE_LOAN",
            Self::LoanAlreadyCompleted => "LOAN_ALREADY_COMPLETED",
            Self::RenewalLimitReached => "RENEWAL_LIMIT_REACHED",
            Self::QueueNonEmpty => "QUEUE_NON_EMPTY",
            Self::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::LoanNotFound(_) => 404,
            Self::BookUnavailable
            | Self::DuplicateActiveLoan
            | Self::LoanAlreadyCompleted
            | Self::RenewalLimitReached
            | Self::QueueNonEmpty
            | Self::InsufficientCredits { .. } => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LoanError::BookUnavailable.error_code(), "BOOK_UNAVAILABLE");
        assert_eq!(
            LoanError::RenewalLimitReached.error_code(),
            "RENEWAL_LIMIT_REACHED"
        );
        assert_eq!(
            LoanError::InsufficientCredits { have: 10, need: 30 }.error_code(),
            "INSUFFICIENT_CREDITS"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(LoanError::LoanNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(LoanError::QueueNonEmpty.http_status_code(), 422);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LoanError::InsufficientCredits { have: 12, need: 30 }.to_string(),
            "Insufficient credits: renewal costs 30, balance is 12"
        );
    }
}
