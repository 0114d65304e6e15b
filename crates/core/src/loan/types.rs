//! Loan domain types and constants.

use serde::{Deserialize, Serialize};

/// Days a loan (and each renewal) runs for.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Maximum number of renewals per loan.
pub const MAX_RENEWALS: i16 = 2;

/// Credits a student-initiated renewal costs. Admin renewals are free.
pub const RENEWAL_COST: i32 = 30;

/// Stored loan state.
///
/// Only `active` and `completed` are persisted; "overdue" is a derived view
/// (see [`EffectiveLoanState`]) so it can never go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanState {
    /// Book is out with the borrower.
    Active,
    /// Book has been returned; the loan is immutable.
    Completed,
}

impl LoanState {
    /// Returns the string representation stored on the loan row.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Parses a stored state string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Loan state as observed at a point in time, with overdue derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveLoanState {
    /// Active and within the due date.
    Active,
    /// Active but past the due date.
    Overdue,
    /// Returned.
    Completed,
}

/// Condition grades a book can be in (best to worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookCondition {
    /// Like new.
    Excellent,
    /// Minor shelf wear.
    VeryGood,
    /// Normal use.
    Good,
    /// Noticeably worn; returning in this grade carries a penalty.
    Fair,
    /// Damaged; returning in this grade carries a heavy penalty.
    Damaged,
}

impl BookCondition {
    /// Returns the string representation stored on book and loan rows.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::VeryGood => "very_good",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Damaged => "damaged",
        }
    }

    /// Parses a stored condition string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "excellent" => Some(Self::Excellent),
            "very_good" => Some(Self::VeryGood),
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "damaged" => Some(Self::Damaged),
            _ => None,
        }
    }

    /// Credit penalty applied when a loan is returned in this condition.
    #[must_use]
    pub fn return_penalty(&self) -> i32 {
        match self {
            Self::Damaged => -50,
            Self::Fair => -20,
            _ => 0,
        }
    }

    /// Whether a return in this grade overwrites the book's stored condition.
    #[must_use]
    pub fn degrades_book(&self) -> bool {
        matches!(self, Self::Fair | Self::Damaged)
    }
}

/// Who is asking for a renewal.
///
/// Student renewals cost [`RENEWAL_COST`] credits and require the balance to
/// cover it; admin renewals are free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalActor {
    /// The borrower, with their current credit balance.
    Student {
        /// Current credit balance of the borrower.
        balance: i32,
    },
    /// An administrator acting on the loan.
    Admin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_state_round_trip() {
        assert_eq!(LoanState::parse("active"), Some(LoanState::Active));
        assert_eq!(LoanState::parse("completed"), Some(LoanState::Completed));
        assert_eq!(LoanState::parse("overdue"), None); // never stored
    }

    #[test]
    fn test_condition_round_trip() {
        for cond in [
            BookCondition::Excellent,
            BookCondition::VeryGood,
            BookCondition::Good,
            BookCondition::Fair,
            BookCondition::Damaged,
        ] {
            assert_eq!(BookCondition::parse(cond.as_str()), Some(cond));
        }
    }

    #[test]
    fn test_return_penalties() {
        assert_eq!(BookCondition::Damaged.return_penalty(), -50);
        assert_eq!(BookCondition::Fair.return_penalty(), -20);
        assert_eq!(BookCondition::Good.return_penalty(), 0);
        assert_eq!(BookCondition::Excellent.return_penalty(), 0);
    }

    #[test]
    fn test_degrades_book() {
        assert!(BookCondition::Damaged.degrades_book());
        assert!(BookCondition::Fair.degrades_book());
        assert!(!BookCondition::Good.degrades_book());
        assert!(!BookCondition::VeryGood.degrades_book());
    }
}
