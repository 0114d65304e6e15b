//! Credit ledger posting and audit logic.
//!
//! This service contains pure business logic with no database dependencies.
//! The repository reads the user's current balance under a row lock, asks
//! this service for the outcome, and persists balance, status, and log entry
//! in one transaction.

use super::error::CreditError;
use super::types::{AccountStatus, CreditBand, CreditKind, PostOutcome, ReplayEntry};

/// Stateless credit ledger service.
pub struct CreditService;

impl CreditService {
    /// Resolve the effect of posting `amount` against `balance_before`.
    ///
    /// The account status is re-derived from the new balance on EVERY
    /// posting, not only on return processing, so a suspension lifts (or
    /// lands) as soon as any posting moves the balance across a band
    /// boundary. See DESIGN.md for the rationale.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::ZeroAmount` when `amount == 0` — no-op
    /// transactions are never recorded.
    pub fn prepare_post(balance_before: i32, amount: i32) -> Result<PostOutcome, CreditError> {
        if amount == 0 {
            return Err(CreditError::ZeroAmount);
        }

        let balance_after = balance_before + amount;

        Ok(PostOutcome {
            amount,
            kind: CreditKind::from_amount(amount),
            balance_before,
            balance_after,
            new_status: Self::status_for_balance(balance_after),
        })
    }

    /// Derives the stored account status for a balance.
    #[must_use]
    pub fn status_for_balance(balance: i32) -> AccountStatus {
        CreditBand::from_balance(balance).account_status()
    }

    /// Replays a user's transaction log from zero in timestamp order.
    ///
    /// Verifies that every entry chains exactly (each balance-before equals
    /// the previous balance-after, starting from 0) and that each entry's
    /// own arithmetic holds. Returns the final balance, which must equal the
    /// balance stored on the user row.
    ///
    /// # Errors
    ///
    /// Returns `BrokenChain` or `InconsistentEntry` pinpointing the first
    /// defect.
    pub fn replay(entries: &[ReplayEntry]) -> Result<i32, CreditError> {
        let mut running = 0i32;

        for (index, entry) in entries.iter().enumerate() {
            if entry.balance_before != running {
                return Err(CreditError::BrokenChain {
                    index,
                    expected: running,
                    actual: entry.balance_before,
                });
            }
            if entry.balance_before + entry.amount != entry.balance_after {
                return Err(CreditError::InconsistentEntry {
                    index,
                    before: entry.balance_before,
                    amount: entry.amount,
                    after: entry.balance_after,
                });
            }
            running = entry.balance_after;
        }

        Ok(running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_earn() {
        let outcome = CreditService::prepare_post(20, 15).unwrap();
        assert_eq!(outcome.kind, CreditKind::Earn);
        assert_eq!(outcome.balance_before, 20);
        assert_eq!(outcome.balance_after, 35);
        assert_eq!(outcome.new_status, AccountStatus::Active);
    }

    #[test]
    fn test_post_spend_into_suspension() {
        let outcome = CreditService::prepare_post(-40, -35).unwrap();
        assert_eq!(outcome.kind, CreditKind::Spend);
        assert_eq!(outcome.balance_after, -75);
        assert_eq!(outcome.new_status, AccountStatus::Suspended);
    }

    #[test]
    fn test_post_lifts_suspension() {
        // A suspended user climbing back above -51 reactivates on the next
        // posting, whatever that posting is.
        let outcome = CreditService::prepare_post(-60, 15).unwrap();
        assert_eq!(outcome.balance_after, -45);
        assert_eq!(outcome.new_status, AccountStatus::Active);
    }

    #[test]
    fn test_post_into_blocked() {
        let outcome = CreditService::prepare_post(-90, -50).unwrap();
        assert_eq!(outcome.balance_after, -140);
        assert_eq!(outcome.new_status, AccountStatus::Blocked);
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert_eq!(
            CreditService::prepare_post(100, 0),
            Err(CreditError::ZeroAmount)
        );
    }

    #[test]
    fn test_replay_empty_is_zero() {
        assert_eq!(CreditService::replay(&[]), Ok(0));
    }

    #[test]
    fn test_replay_chains() {
        let entries = [
            ReplayEntry {
                amount: 10,
                balance_before: 0,
                balance_after: 10,
            },
            ReplayEntry {
                amount: -30,
                balance_before: 10,
                balance_after: -20,
            },
            ReplayEntry {
                amount: 15,
                balance_before: -20,
                balance_after: -5,
            },
        ];
        assert_eq!(CreditService::replay(&entries), Ok(-5));
    }

    #[test]
    fn test_replay_detects_gap() {
        let entries = [
            ReplayEntry {
                amount: 10,
                balance_before: 0,
                balance_after: 10,
            },
            ReplayEntry {
                amount: 5,
                balance_before: 12,
                balance_after: 17,
            },
        ];
        assert_eq!(
            CreditService::replay(&entries),
            Err(CreditError::BrokenChain {
                index: 1,
                expected: 10,
                actual: 12
            })
        );
    }

    #[test]
    fn test_replay_detects_bad_arithmetic() {
        let entries = [ReplayEntry {
            amount: 10,
            balance_before: 0,
            balance_after: 11,
        }];
        assert_eq!(
            CreditService::replay(&entries),
            Err(CreditError::InconsistentEntry {
                index: 0,
                before: 0,
                amount: 10,
                after: 11
            })
        );
    }
}
