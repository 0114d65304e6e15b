//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Engine components carry their own precise error enums; this type is the
/// coarse taxonomy the HTTP boundary translates them into.
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A business precondition does not hold.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Account status forbids the action.
    #[error("Account restricted: {0}")]
    AccountRestricted(String),

    /// Lock or transaction could not be acquired in time; safe to retry.
    #[error("Contention: {0}")]
    Contention(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::PreconditionFailed(_) => 422,
            Self::AccountRestricted(_) => 403,
            Self::Contention(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::PreconditionFailed(_) => "PRECONDITION_FAILED",
            Self::AccountRestricted(_) => "ACCOUNT_RESTRICTED",
            Self::Contention(_) => "CONTENTION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the operation as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(
            AppError::PreconditionFailed(String::new()).status_code(),
            422
        );
        assert_eq!(
            AppError::AccountRestricted(String::new()).status_code(),
            403
        );
        assert_eq!(AppError::Contention(String::new()).status_code(), 409);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_FAILED"
        );
        assert_eq!(
            AppError::PreconditionFailed(String::new()).error_code(),
            "PRECONDITION_FAILED"
        );
        assert_eq!(
            AppError::AccountRestricted(String::new()).error_code(),
            "ACCOUNT_RESTRICTED"
        );
        assert_eq!(
            AppError::Contention(String::new()).error_code(),
            "CONTENTION"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(AppError::Contention(String::new()).is_retryable());
        assert!(!AppError::NotFound(String::new()).is_retryable());
        assert!(!AppError::PreconditionFailed(String::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::PreconditionFailed("book unavailable".into()).to_string(),
            "Precondition failed: book unavailable"
        );
        assert_eq!(
            AppError::Contention("book row locked".into()).to_string(),
            "Contention: book row locked"
        );
    }
}
