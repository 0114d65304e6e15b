//! Property-based tests for loan lifecycle rules.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use super::service::LoanService;
use super::types::{BookCondition, EffectiveLoanState, LoanState, RenewalActor, MAX_RENEWALS};

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2024i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_condition() -> impl Strategy<Value = BookCondition> {
    prop_oneof![
        Just(BookCondition::Excellent),
        Just(BookCondition::VeryGood),
        Just(BookCondition::Good),
        Just(BookCondition::Fair),
        Just(BookCondition::Damaged),
    ]
}

proptest! {
    /// The return delta is always the punctuality base plus the condition
    /// penalty, and the base is one of exactly {15, 10, 0}.
    #[test]
    fn return_delta_decomposes(
        due in arb_date(),
        offset in -60i64..=60,
        condition in arb_condition(),
    ) {
        let returned = due - Duration::days(offset);
        let delta = LoanService::return_credit_delta(due, returned, condition);
        let base = delta - condition.return_penalty();

        if offset >= 3 {
            prop_assert_eq!(base, 15);
        } else if offset >= 0 {
            prop_assert_eq!(base, 10);
        } else {
            prop_assert_eq!(base, 0);
        }
    }

    /// Earlier returns never earn less than later returns of the same book
    /// in the same condition.
    #[test]
    fn return_delta_monotone_in_earliness(
        due in arb_date(),
        a in -60i64..=60,
        b in -60i64..=60,
        condition in arb_condition(),
    ) {
        let (earlier, later) = (a.max(b), a.min(b));
        let d_early =
            LoanService::return_credit_delta(due, due - Duration::days(earlier), condition);
        let d_late =
            LoanService::return_credit_delta(due, due - Duration::days(later), condition);
        prop_assert!(d_early >= d_late);
    }

    /// A renewal never succeeds at or past the renewal cap.
    #[test]
    fn renewal_cap_holds(renewals in MAX_RENEWALS..=i16::MAX, balance in 0i32..=10_000) {
        let student = LoanService::validate_renew(
            LoanState::Active,
            renewals,
            0,
            RenewalActor::Student { balance },
        );
        prop_assert!(student.is_err());
        let admin =
            LoanService::validate_renew(LoanState::Active, renewals, 0, RenewalActor::Admin);
        prop_assert!(admin.is_err());
    }

    /// Overdue is derived, never stored: an active loan reads as overdue
    /// exactly when observed strictly after its due date.
    #[test]
    fn overdue_is_derived(due in arb_date(), offset in -60i64..=60) {
        let today = due + Duration::days(offset);
        let state = LoanService::effective_state(LoanState::Active, due, today);
        if offset > 0 {
            prop_assert_eq!(state, EffectiveLoanState::Overdue);
        } else {
            prop_assert_eq!(state, EffectiveLoanState::Active);
        }
    }

    /// The due date is always exactly fourteen days out.
    #[test]
    fn due_date_is_fourteen_days(today in arb_date()) {
        prop_assert_eq!((LoanService::due_date(today) - today).num_days(), 14);
    }
}
