//! Rating errors.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised when submitting a rating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    /// No loan with this id.
    #[error("loan not found: {0}")]
    LoanNotFound(Uuid),

    /// Scores are 1 to 5 inclusive.
    #[error("score must be between 1 and 5, got {0}")]
    ScoreOutOfRange(i16),

    /// Only completed loans can be rated.
    #[error("loan is not completed")]
    LoanNotCompleted,

    /// Only the borrower of the loan may rate it.
    #[error("only the borrower may rate this loan")]
    NotBorrower,

    /// One rating per loan, rater and category.
    #[error("this loan has already been rated in this category")]
    AlreadyRated,

    /// The book has no donor on record to receive the rating.
    #[error("book has no donor to rate")]
    MissingDonor,
}

impl RatingError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LoanNotFound(_) => "LOAN_NOT_FOUND",
            Self::ScoreOutOfRange(_) => "SCORE_OUT_OF_RANGE",
            Self::LoanNotCompleted => "LOAN_NOT_COMPLETED",
            Self::NotBorrower => "NOT_BORROWER",
            Self::AlreadyRated => "ALREADY_RATED",
            Self::MissingDonor => "MISSING_DONOR",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::LoanNotFound(_) => 404,
            Self::ScoreOutOfRange(_) => 400,
            Self::NotBorrower => 403,
            _ => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RatingError::LoanNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(RatingError::ScoreOutOfRange(7).http_status_code(), 400);
        assert_eq!(RatingError::NotBorrower.http_status_code(), 403);
        assert_eq!(RatingError::AlreadyRated.http_status_code(), 422);
    }
}
