//! Approval arbitration rules.

use crate::credit::{AccountStatus, CreditBand};

use super::error::ArbitrationError;
use super::types::{Decision, EligibilityInput};

/// Stateless arbitration service.
pub struct ArbitrationService;

impl ArbitrationService {
    /// Evaluate an approval against a locked snapshot.
    ///
    /// Checks run in a fixed order: request state, book loan state, book
    /// availability, then credit standing. Standing is re-derived from the
    /// balance at decision time; when the derived band is more restrictive
    /// than the stored status, the denial carries the demotion to persist.
    #[must_use]
    pub fn evaluate(input: EligibilityInput) -> Decision {
        if !input.request_pending {
            return Decision::Deny {
                error: ArbitrationError::RequestNotPending,
                demote_to: None,
            };
        }
        if input.book_on_loan {
            return Decision::Deny {
                error: ArbitrationError::BookAlreadyOnLoan,
                demote_to: None,
            };
        }
        if !input.book_available {
            return Decision::Deny {
                error: ArbitrationError::BookUnavailable,
                demote_to: None,
            };
        }

        let band = CreditBand::from_balance(input.balance);
        let derived = band.account_status();
        let demote_to = Self::demotion(input.requester_status, derived);
        let effective = demote_to.unwrap_or(input.requester_status);

        match effective {
            AccountStatus::Blocked => Decision::Deny {
                error: ArbitrationError::AccountBlocked,
                demote_to,
            },
            AccountStatus::Suspended => Decision::Deny {
                error: ArbitrationError::AccountSuspended,
                demote_to,
            },
            AccountStatus::Active => {
                if band == CreditBand::Warning && input.open_loans_held >= 1 {
                    Decision::Deny {
                        error: ArbitrationError::WarningLoanLimit,
                        demote_to: None,
                    }
                } else {
                    Decision::Approve
                }
            }
        }
    }

    /// Validate a manual rejection reason.
    ///
    /// # Errors
    ///
    /// `EmptyRejectionReason` when the reason is blank.
    pub fn validate_reject(reason: &str) -> Result<(), ArbitrationError> {
        if reason.trim().is_empty() {
            return Err(ArbitrationError::EmptyRejectionReason);
        }
        Ok(())
    }

    /// The status to demote to, when the balance-derived status is more
    /// restrictive than the stored one. Promotion never happens here; it
    /// is applied by ledger postings.
    fn demotion(stored: AccountStatus, derived: AccountStatus) -> Option<AccountStatus> {
        fn rank(status: AccountStatus) -> u8 {
            match status {
                AccountStatus::Active => 0,
                AccountStatus::Suspended => 1,
                AccountStatus::Blocked => 2,
            }
        }
        if rank(derived) > rank(stored) {
            Some(derived)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_input() -> EligibilityInput {
        EligibilityInput {
            request_pending: true,
            book_on_loan: false,
            book_available: true,
            requester_status: AccountStatus::Active,
            balance: 50,
            open_loans_held: 0,
        }
    }

    #[test]
    fn test_clean_approval() {
        assert_eq!(ArbitrationService::evaluate(clean_input()), Decision::Approve);
    }

    #[test]
    fn test_stale_request() {
        let input = EligibilityInput {
            request_pending: false,
            ..clean_input()
        };
        assert_eq!(
            ArbitrationService::evaluate(input),
            Decision::Deny {
                error: ArbitrationError::RequestNotPending,
                demote_to: None,
            }
        );
    }

    #[test]
    fn test_book_race_lost() {
        let input = EligibilityInput {
            book_on_loan: true,
            ..clean_input()
        };
        assert_eq!(
            ArbitrationService::evaluate(input),
            Decision::Deny {
                error: ArbitrationError::BookAlreadyOnLoan,
                demote_to: None,
            }
        );
    }

    #[test]
    fn test_book_unavailable() {
        let input = EligibilityInput {
            book_available: false,
            ..clean_input()
        };
        assert_eq!(
            ArbitrationService::evaluate(input),
            Decision::Deny {
                error: ArbitrationError::BookUnavailable,
                demote_to: None,
            }
        );
    }

    #[test]
    fn test_warning_band_one_loan_allowed() {
        let input = EligibilityInput {
            balance: -30,
            open_loans_held: 0,
            ..clean_input()
        };
        assert_eq!(ArbitrationService::evaluate(input), Decision::Approve);
    }

    #[test]
    fn test_warning_band_second_loan_denied() {
        let input = EligibilityInput {
            balance: -30,
            open_loans_held: 1,
            ..clean_input()
        };
        assert_eq!(
            ArbitrationService::evaluate(input),
            Decision::Deny {
                error: ArbitrationError::WarningLoanLimit,
                demote_to: None,
            }
        );
    }

    #[test]
    fn test_suspended_balance_demotes_stale_status() {
        // Stored status lags behind the balance: the denial carries the
        // demotion so the approval transaction can persist it.
        let input = EligibilityInput {
            balance: -75,
            requester_status: AccountStatus::Active,
            ..clean_input()
        };
        assert_eq!(
            ArbitrationService::evaluate(input),
            Decision::Deny {
                error: ArbitrationError::AccountSuspended,
                demote_to: Some(AccountStatus::Suspended),
            }
        );
    }

    #[test]
    fn test_blocked_balance() {
        let input = EligibilityInput {
            balance: -150,
            requester_status: AccountStatus::Blocked,
            ..clean_input()
        };
        assert_eq!(
            ArbitrationService::evaluate(input),
            Decision::Deny {
                error: ArbitrationError::AccountBlocked,
                demote_to: None,
            }
        );
    }

    #[test]
    fn test_stored_status_never_promoted() {
        // A healthy balance does not lift a stored suspension here.
        let input = EligibilityInput {
            balance: 100,
            requester_status: AccountStatus::Suspended,
            ..clean_input()
        };
        assert_eq!(
            ArbitrationService::evaluate(input),
            Decision::Deny {
                error: ArbitrationError::AccountSuspended,
                demote_to: None,
            }
        );
    }

    #[test]
    fn test_reject_reason_required() {
        assert!(ArbitrationService::validate_reject("book reserved for a course").is_ok());
        assert_eq!(
            ArbitrationService::validate_reject("   "),
            Err(ArbitrationError::EmptyRejectionReason)
        );
    }
}
