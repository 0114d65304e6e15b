//! Property tests for credit ledger posting and replay.

use proptest::prelude::*;

use super::service::CreditService;
use super::types::{AccountStatus, CreditBand, CreditKind, ReplayEntry};

/// Strategy for signed, non-zero posting amounts.
fn amount_strategy() -> impl Strategy<Value = i32> {
    prop_oneof![1i32..=200, -200i32..=-1]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Replaying a log built by successive postings from balance 0 always
    /// reproduces the final balance exactly.
    #[test]
    fn prop_replay_reproduces_balance(amounts in prop::collection::vec(amount_strategy(), 0..40)) {
        let mut balance = 0i32;
        let mut entries = Vec::with_capacity(amounts.len());

        for amount in amounts {
            let outcome = CreditService::prepare_post(balance, amount).unwrap();
            entries.push(ReplayEntry {
                amount: outcome.amount,
                balance_before: outcome.balance_before,
                balance_after: outcome.balance_after,
            });
            balance = outcome.balance_after;
        }

        prop_assert_eq!(CreditService::replay(&entries), Ok(balance));
    }

    /// Corrupting any single before-snapshot breaks the replay.
    #[test]
    fn prop_replay_detects_tampering(
        amounts in prop::collection::vec(amount_strategy(), 1..20),
        victim in 0usize..20,
        bump in 1i32..50,
    ) {
        let mut balance = 0i32;
        let mut entries = Vec::with_capacity(amounts.len());
        for amount in amounts {
            let outcome = CreditService::prepare_post(balance, amount).unwrap();
            entries.push(ReplayEntry {
                amount: outcome.amount,
                balance_before: outcome.balance_before,
                balance_after: outcome.balance_after,
            });
            balance = outcome.balance_after;
        }

        let victim = victim % entries.len();
        entries[victim].balance_before += bump;

        prop_assert!(CreditService::replay(&entries).is_err());
    }

    /// The posting kind always matches the amount's sign.
    #[test]
    fn prop_kind_matches_sign(balance in -500i32..500, amount in amount_strategy()) {
        let outcome = CreditService::prepare_post(balance, amount).unwrap();
        if amount > 0 {
            prop_assert_eq!(outcome.kind, CreditKind::Earn);
        } else {
            prop_assert_eq!(outcome.kind, CreditKind::Spend);
        }
    }

    /// Status derivation agrees with the band at every balance.
    #[test]
    fn prop_status_matches_band(balance in -300i32..300) {
        let status = CreditService::status_for_balance(balance);
        let expected = match CreditBand::from_balance(balance) {
            CreditBand::Good | CreditBand::Warning => AccountStatus::Active,
            CreditBand::Suspended => AccountStatus::Suspended,
            CreditBand::Blocked => AccountStatus::Blocked,
        };
        prop_assert_eq!(status, expected);
    }
}
