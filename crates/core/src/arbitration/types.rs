//! Arbitration input and output types.

use serde::{Deserialize, Serialize};

use crate::credit::AccountStatus;

use super::error::ArbitrationError;

/// Lifecycle of a loan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Awaiting an administrator's decision.
    Pending,
    /// Accepted; a loan was opened.
    Accepted,
    /// Rejected, by an administrator or by arbitration.
    Rejected,
}

impl RequestState {
    /// Storage string for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a storage string back into a state.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Snapshot of everything arbitration inspects, read under row locks
/// inside the approval transaction.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityInput {
    /// Request is still pending.
    pub request_pending: bool,
    /// A non-completed loan already exists for the book.
    pub book_on_loan: bool,
    /// The book's availability flag.
    pub book_available: bool,
    /// Requester's stored account status.
    pub requester_status: AccountStatus,
    /// Requester's current credit balance.
    pub balance: i32,
    /// Non-completed loans the requester currently holds.
    pub open_loans_held: u64,
}

/// Arbitration verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// All checks passed; open the loan.
    Approve,
    /// A check failed.
    Deny {
        /// Which check failed.
        error: ArbitrationError,
        /// Status the requester's account must be demoted to when the
        /// stored status lags behind the balance-derived band.
        demote_to: Option<AccountStatus>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_state_roundtrip() {
        for state in [
            RequestState::Pending,
            RequestState::Accepted,
            RequestState::Rejected,
        ] {
            assert_eq!(RequestState::parse(state.as_str()), Some(state));
        }
        assert_eq!(RequestState::parse("open"), None);
    }
}
