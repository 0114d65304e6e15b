//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every mutating operation runs as one database
//! transaction; rows that serialize an operation are taken with
//! `SELECT ... FOR UPDATE`.

pub mod credit;
pub mod loan;
pub mod rating;
pub mod reputation;
pub mod request;
pub mod reservation;

pub use credit::{CreditError, CreditRepository, PostCreditInput};
pub use loan::{LoanRepoError, LoanRepository, LoanView, ProcessReturnInput, RenewLoanInput};
pub use rating::{RatingRepoError, RatingRepository, SubmitRatingInput};
pub use reputation::{
    BookRatingSummary, Leaderboards, ProfileView, RankEntry, ReputationError, ReputationRepository,
};
pub use request::{ApproveOutcome, RequestError, RequestRepository};
pub use reservation::{ReservationRepoError, ReservationRepository};

use sea_orm::DbErr;

/// Whether a database error is a lock or serialization conflict that the
/// caller may retry. Postgres reports these as SQLSTATE 40001
/// (serialization_failure), 40P01 (deadlock_detected) and 55P03
/// (lock_not_available).
#[must_use]
pub(crate) fn is_contention(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("40001")
        || msg.contains("40P01")
        || msg.contains("55P03")
        || msg.contains("could not serialize access")
        || msg.contains("deadlock detected")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contention_detection() {
        let err = DbErr::Custom("ERROR: could not serialize access due to concurrent update (SQLSTATE 40001)".into());
        assert!(is_contention(&err));

        let err = DbErr::Custom("ERROR: deadlock detected (SQLSTATE 40P01)".into());
        assert!(is_contention(&err));

        let err = DbErr::Custom("connection refused".into());
        assert!(!is_contention(&err));
    }
}
