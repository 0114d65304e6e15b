//! Rating submission rules.

use uuid::Uuid;

use crate::loan::LoanState;

use super::error::RatingError;
use super::types::{MAX_SCORE, MIN_SCORE};

/// Stateless rating service.
pub struct RatingService;

impl RatingService {
    /// Validate a rating submission against the loan's snapshot.
    ///
    /// Returns the ratee (the book's donor) on success.
    ///
    /// # Errors
    ///
    /// `ScoreOutOfRange`, `LoanNotCompleted`, `NotBorrower`, `AlreadyRated`,
    /// or `MissingDonor`, checked in that order.
    pub fn validate_submission(
        score: i16,
        loan_state: LoanState,
        borrower_id: Uuid,
        rater_id: Uuid,
        already_rated: bool,
        donor_id: Option<Uuid>,
    ) -> Result<Uuid, RatingError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(RatingError::ScoreOutOfRange(score));
        }
        if loan_state != LoanState::Completed {
            return Err(RatingError::LoanNotCompleted);
        }
        if rater_id != borrower_id {
            return Err(RatingError::NotBorrower);
        }
        if already_rated {
            return Err(RatingError::AlreadyRated);
        }
        donor_id.ok_or(RatingError::MissingDonor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission_returns_donor() {
        let borrower = Uuid::new_v4();
        let donor = Uuid::new_v4();
        let ratee = RatingService::validate_submission(
            4,
            LoanState::Completed,
            borrower,
            borrower,
            false,
            Some(donor),
        )
        .unwrap();
        assert_eq!(ratee, donor);
    }

    #[test]
    fn test_score_bounds() {
        let user = Uuid::new_v4();
        for score in [0, 6, -1] {
            assert_eq!(
                RatingService::validate_submission(
                    score,
                    LoanState::Completed,
                    user,
                    user,
                    false,
                    Some(Uuid::new_v4()),
                ),
                Err(RatingError::ScoreOutOfRange(score))
            );
        }
        for score in [1, 5] {
            assert!(RatingService::validate_submission(
                score,
                LoanState::Completed,
                user,
                user,
                false,
                Some(Uuid::new_v4()),
            )
            .is_ok());
        }
    }

    #[test]
    fn test_active_loan_rejected() {
        let user = Uuid::new_v4();
        assert_eq!(
            RatingService::validate_submission(
                3,
                LoanState::Active,
                user,
                user,
                false,
                Some(Uuid::new_v4()),
            ),
            Err(RatingError::LoanNotCompleted)
        );
    }

    #[test]
    fn test_only_borrower_rates() {
        assert_eq!(
            RatingService::validate_submission(
                3,
                LoanState::Completed,
                Uuid::new_v4(),
                Uuid::new_v4(),
                false,
                Some(Uuid::new_v4()),
            ),
            Err(RatingError::NotBorrower)
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let user = Uuid::new_v4();
        assert_eq!(
            RatingService::validate_submission(
                3,
                LoanState::Completed,
                user,
                user,
                true,
                Some(Uuid::new_v4()),
            ),
            Err(RatingError::AlreadyRated)
        );
    }

    #[test]
    fn test_missing_donor() {
        let user = Uuid::new_v4();
        assert_eq!(
            RatingService::validate_submission(3, LoanState::Completed, user, user, false, None),
            Err(RatingError::MissingDonor)
        );
    }
}
