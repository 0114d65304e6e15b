//! Loan lifecycle rules: open, renew, return, derived overdue.

use chrono::{Duration, NaiveDate};

use super::error::LoanError;
use super::types::{
    BookCondition, EffectiveLoanState, LoanState, RenewalActor, LOAN_PERIOD_DAYS, MAX_RENEWALS,
    RENEWAL_COST,
};

/// Stateless loan lifecycle service.
///
/// Every function takes snapshots of stored state and returns a decision;
/// the repository applies the decision inside one database transaction.
pub struct LoanService;

impl LoanService {
    /// Due date for a loan opened on `today`.
    #[must_use]
    pub fn due_date(today: NaiveDate) -> NaiveDate {
        today + Duration::days(LOAN_PERIOD_DAYS)
    }

    /// Due date after a renewal: the current due date extended by a
    /// full loan period, regardless of when the renewal happens.
    #[must_use]
    pub fn renewed_due_date(current_due: NaiveDate) -> NaiveDate {
        current_due + Duration::days(LOAN_PERIOD_DAYS)
    }

    /// Validate opening a loan for a book.
    ///
    /// # Errors
    ///
    /// `BookUnavailable` when the availability flag is down,
    /// `DuplicateActiveLoan` when a non-completed loan already exists.
    pub fn validate_open(book_available: bool, has_open_loan: bool) -> Result<(), LoanError> {
        if has_open_loan {
            return Err(LoanError::DuplicateActiveLoan);
        }
        if !book_available {
            return Err(LoanError::BookUnavailable);
        }
        Ok(())
    }

    /// Validate a renewal and resolve what it costs.
    ///
    /// Returns `Some(RENEWAL_COST)` for student-initiated renewals (to be
    /// posted as a ledger spend) and `None` for admin-initiated ones.
    ///
    /// # Errors
    ///
    /// `LoanAlreadyCompleted`, `RenewalLimitReached`, `QueueNonEmpty`, or
    /// `InsufficientCredits` in that order.
    pub fn validate_renew(
        state: LoanState,
        renewals: i16,
        active_reservations: u64,
        actor: RenewalActor,
    ) -> Result<Option<i32>, LoanError> {
        if state == LoanState::Completed {
            return Err(LoanError::LoanAlreadyCompleted);
        }
        if renewals >= MAX_RENEWALS {
            return Err(LoanError::RenewalLimitReached);
        }
        if active_reservations > 0 {
            return Err(LoanError::QueueNonEmpty);
        }
        match actor {
            RenewalActor::Student { balance } => {
                if balance < RENEWAL_COST {
                    return Err(LoanError::InsufficientCredits {
                        have: balance,
                        need: RENEWAL_COST,
                    });
                }
                Ok(Some(RENEWAL_COST))
            }
            RenewalActor::Admin => Ok(None),
        }
    }

    /// Validate processing a return.
    ///
    /// # Errors
    ///
    /// `LoanAlreadyCompleted` when the loan is already closed.
    pub fn validate_return(state: LoanState) -> Result<(), LoanError> {
        if state == LoanState::Completed {
            return Err(LoanError::LoanAlreadyCompleted);
        }
        Ok(())
    }

    /// Loan state as observed on `today`, with overdue derived.
    #[must_use]
    pub fn effective_state(
        state: LoanState,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> EffectiveLoanState {
        match state {
            LoanState::Completed => EffectiveLoanState::Completed,
            LoanState::Active if today > due_date => EffectiveLoanState::Overdue,
            LoanState::Active => EffectiveLoanState::Active,
        }
    }

    /// Signed credit delta earned by a return.
    ///
    /// Punctuality base first (+15 at >= 3 days early, +10 at 0..=2 days
    /// early, 0 when late), then the condition penalty on top — a damaged
    /// book returned 5 days early nets 15 - 50 = -35.
    #[must_use]
    pub fn return_credit_delta(
        due_date: NaiveDate,
        returned: NaiveDate,
        condition: BookCondition,
    ) -> i32 {
        let days_early = (due_date - returned).num_days();

        let base = if days_early >= 3 {
            15
        } else if days_early >= 0 {
            10
        } else {
            0
        };

        base + condition.return_penalty()
    }

    /// Audit-log reason text for a return's credit posting.
    #[must_use]
    pub fn return_reason(due_date: NaiveDate, returned: NaiveDate, condition: BookCondition) -> String {
        let days_early = (due_date - returned).num_days();

        let mut reason = if days_early >= 3 {
            format!("Early return ({days_early} days before due)")
        } else if days_early >= 0 {
            "On-time return".to_string()
        } else {
            format!("Late return ({} days overdue)", -days_early)
        };

        match condition {
            BookCondition::Damaged => reason.push_str(" - damaged book penalty"),
            BookCondition::Fair => reason.push_str(" - fair condition penalty"),
            _ => {}
        }

        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_date() {
        assert_eq!(
            LoanService::due_date(date(2026, 3, 1)),
            date(2026, 3, 15)
        );
    }

    #[test]
    fn test_renewed_due_date_extends_from_due() {
        assert_eq!(
            LoanService::renewed_due_date(date(2026, 3, 15)),
            date(2026, 3, 29)
        );
    }

    #[test]
    fn test_validate_open() {
        assert!(LoanService::validate_open(true, false).is_ok());
        assert_eq!(
            LoanService::validate_open(false, false),
            Err(LoanError::BookUnavailable)
        );
        // The duplicate-loan re-check outranks the availability flag.
        assert_eq!(
            LoanService::validate_open(true, true),
            Err(LoanError::DuplicateActiveLoan)
        );
        assert_eq!(
            LoanService::validate_open(false, true),
            Err(LoanError::DuplicateActiveLoan)
        );
    }

    #[test]
    fn test_renew_student_pays() {
        let charge = LoanService::validate_renew(
            LoanState::Active,
            0,
            0,
            RenewalActor::Student { balance: 45 },
        )
        .unwrap();
        assert_eq!(charge, Some(RENEWAL_COST));
    }

    #[test]
    fn test_renew_admin_free() {
        let charge =
            LoanService::validate_renew(LoanState::Active, 1, 0, RenewalActor::Admin).unwrap();
        assert_eq!(charge, None);
    }

    #[test]
    fn test_renew_limit() {
        // Third renewal fails regardless of elapsed time or actor.
        assert_eq!(
            LoanService::validate_renew(LoanState::Active, 2, 0, RenewalActor::Admin),
            Err(LoanError::RenewalLimitReached)
        );
    }

    #[test]
    fn test_renew_blocked_by_queue() {
        assert_eq!(
            LoanService::validate_renew(
                LoanState::Active,
                0,
                1,
                RenewalActor::Student { balance: 100 }
            ),
            Err(LoanError::QueueNonEmpty)
        );
    }

    #[test]
    fn test_renew_insufficient_credits() {
        assert_eq!(
            LoanService::validate_renew(
                LoanState::Active,
                0,
                0,
                RenewalActor::Student { balance: 29 }
            ),
            Err(LoanError::InsufficientCredits { have: 29, need: 30 })
        );
    }

    #[test]
    fn test_renew_completed() {
        assert_eq!(
            LoanService::validate_renew(LoanState::Completed, 0, 0, RenewalActor::Admin),
            Err(LoanError::LoanAlreadyCompleted)
        );
    }

    #[test]
    fn test_effective_state() {
        let due = date(2026, 3, 15);
        assert_eq!(
            LoanService::effective_state(LoanState::Active, due, date(2026, 3, 10)),
            EffectiveLoanState::Active
        );
        // The due date itself is not overdue.
        assert_eq!(
            LoanService::effective_state(LoanState::Active, due, due),
            EffectiveLoanState::Active
        );
        assert_eq!(
            LoanService::effective_state(LoanState::Active, due, date(2026, 3, 16)),
            EffectiveLoanState::Overdue
        );
        assert_eq!(
            LoanService::effective_state(LoanState::Completed, due, date(2026, 4, 1)),
            EffectiveLoanState::Completed
        );
    }

    #[test]
    fn test_delta_early_clean() {
        let due = date(2026, 3, 15);
        assert_eq!(
            LoanService::return_credit_delta(due, date(2026, 3, 12), BookCondition::Good),
            15
        );
    }

    #[test]
    fn test_delta_on_time_boundaries() {
        let due = date(2026, 3, 15);
        // 2 days early and returning exactly on the due date both pay +10.
        assert_eq!(
            LoanService::return_credit_delta(due, date(2026, 3, 13), BookCondition::Excellent),
            10
        );
        assert_eq!(
            LoanService::return_credit_delta(due, due, BookCondition::Excellent),
            10
        );
    }

    #[test]
    fn test_delta_late() {
        let due = date(2026, 3, 15);
        assert_eq!(
            LoanService::return_credit_delta(due, date(2026, 3, 20), BookCondition::Good),
            0
        );
    }

    #[test]
    fn test_delta_damaged_early_nets_minus_35() {
        let due = date(2026, 3, 15);
        assert_eq!(
            LoanService::return_credit_delta(due, date(2026, 3, 10), BookCondition::Damaged),
            -35
        );
    }

    #[test]
    fn test_delta_fair_late() {
        let due = date(2026, 3, 15);
        assert_eq!(
            LoanService::return_credit_delta(due, date(2026, 3, 18), BookCondition::Fair),
            -20
        );
    }

    #[test]
    fn test_return_reason_mentions_penalty() {
        let due = date(2026, 3, 15);
        let reason = LoanService::return_reason(due, date(2026, 3, 10), BookCondition::Damaged);
        assert!(reason.contains("Early return"));
        assert!(reason.contains("damaged"));
    }
}
