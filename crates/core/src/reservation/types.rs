//! Reservation state machine types.

use serde::{Deserialize, Serialize};

/// Days a notified reserver has to confirm before the slot lapses.
pub const CONFIRMATION_WINDOW_DAYS: i64 = 2;

/// Lifecycle of a queue entry.
///
/// `Active` entries hold a queue position. `Notified` is the head that
/// has been offered the returned book. The remaining three states are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    /// Waiting in the queue.
    Active,
    /// Offered the book, confirmation window running.
    Notified,
    /// Confirmed within the window; converted into a loan request.
    Confirmed,
    /// Withdrawn by the reserver.
    Cancelled,
    /// Confirmation window elapsed without a claim.
    Expired,
}

impl ReservationState {
    /// Storage string for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Notified => "notified",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Parse a storage string back into a state.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "notified" => Some(Self::Notified),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Whether this entry still occupies the queue and counts toward
    /// the per-user live-reservation limit.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active | Self::Notified)
    }
}

/// Result of a confirmation attempt on a notified entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Claimed inside the window; a pending loan request is created.
    Confirmed,
    /// Window already elapsed; entry lapses without a request.
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        for state in [
            ReservationState::Active,
            ReservationState::Notified,
            ReservationState::Confirmed,
            ReservationState::Cancelled,
            ReservationState::Expired,
        ] {
            assert_eq!(ReservationState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ReservationState::parse("pending"), None);
    }

    #[test]
    fn test_liveness() {
        assert!(ReservationState::Active.is_live());
        assert!(ReservationState::Notified.is_live());
        assert!(!ReservationState::Confirmed.is_live());
        assert!(!ReservationState::Cancelled.is_live());
        assert!(!ReservationState::Expired.is_live());
    }
}
