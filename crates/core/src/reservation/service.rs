//! Reservation queue rules.

use chrono::{DateTime, Duration, Utc};

use crate::credit::AccountStatus;

use super::error::ReservationError;
use super::types::{ConfirmOutcome, ReservationState, CONFIRMATION_WINDOW_DAYS};

/// Stateless reservation queue service.
pub struct ReservationService;

impl ReservationService {
    /// Validate joining a book's queue.
    ///
    /// # Errors
    ///
    /// `BookAvailable` when the book is on the shelf, `DuplicateReservation`
    /// when the user already holds a live entry, `AccountRestricted` for
    /// suspended or blocked accounts.
    pub fn validate_enqueue(
        book_available: bool,
        has_live_reservation: bool,
        requester_status: AccountStatus,
    ) -> Result<(), ReservationError> {
        if requester_status.is_restricted() {
            return Err(ReservationError::AccountRestricted);
        }
        if book_available {
            return Err(ReservationError::BookAvailable);
        }
        if has_live_reservation {
            return Err(ReservationError::DuplicateReservation);
        }
        Ok(())
    }

    /// Position assigned to a new entry given the current count of
    /// position-holding entries. Positions are dense and 1-based.
    #[must_use]
    pub fn next_position(live_count: u64) -> i32 {
        i32::try_from(live_count).unwrap_or(i32::MAX - 1) + 1
    }

    /// Validate cancelling an entry. Only live entries can be cancelled.
    ///
    /// # Errors
    ///
    /// `AlreadyProcessed` for terminal entries.
    pub fn validate_cancel(state: ReservationState) -> Result<(), ReservationError> {
        if state.is_live() {
            Ok(())
        } else {
            Err(ReservationError::AlreadyProcessed)
        }
    }

    /// New position for a remaining entry after one at `cancelled_position`
    /// leaves the queue. Entries behind the gap shift forward by one.
    #[must_use]
    pub fn position_after_cancel(position: i32, cancelled_position: i32) -> i32 {
        if position > cancelled_position {
            position - 1
        } else {
            position
        }
    }

    /// Deadline for a head notified at `now` to confirm.
    #[must_use]
    pub fn notification_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(CONFIRMATION_WINDOW_DAYS)
    }

    /// Resolve a confirmation attempt observed at `now`.
    ///
    /// A lapsed window yields `Expired` rather than an error so the caller
    /// can persist the expiry it just observed. A notified entry with no
    /// recorded deadline is treated as lapsed, never silently confirmed.
    ///
    /// # Errors
    ///
    /// `AlreadyProcessed` for terminal entries, `NotNotified` for entries
    /// still waiting in the queue.
    pub fn confirm_outcome(
        state: ReservationState,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<ConfirmOutcome, ReservationError> {
        match state {
            ReservationState::Notified => match expires_at {
                Some(deadline) if now <= deadline => Ok(ConfirmOutcome::Confirmed),
                _ => Ok(ConfirmOutcome::Expired),
            },
            ReservationState::Active => Err(ReservationError::NotNotified),
            _ => Err(ReservationError::AlreadyProcessed),
        }
    }

    /// Check that a queue's positions are dense, 1-based and duplicate-free.
    /// `positions` must be sorted ascending.
    #[must_use]
    pub fn positions_are_dense(positions: &[i32]) -> bool {
        positions
            .iter()
            .enumerate()
            .all(|(idx, &pos)| pos == i32::try_from(idx).unwrap_or(i32::MAX) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_ok() {
        assert!(ReservationService::validate_enqueue(false, false, AccountStatus::Active).is_ok());
    }

    #[test]
    fn test_enqueue_restriction_checked_first() {
        assert_eq!(
            ReservationService::validate_enqueue(true, true, AccountStatus::Suspended),
            Err(ReservationError::AccountRestricted)
        );
        assert_eq!(
            ReservationService::validate_enqueue(false, false, AccountStatus::Blocked),
            Err(ReservationError::AccountRestricted)
        );
    }

    #[test]
    fn test_enqueue_available_book() {
        assert_eq!(
            ReservationService::validate_enqueue(true, false, AccountStatus::Active),
            Err(ReservationError::BookAvailable)
        );
    }

    #[test]
    fn test_enqueue_duplicate() {
        assert_eq!(
            ReservationService::validate_enqueue(false, true, AccountStatus::Active),
            Err(ReservationError::DuplicateReservation)
        );
    }

    #[test]
    fn test_next_position() {
        assert_eq!(ReservationService::next_position(0), 1);
        assert_eq!(ReservationService::next_position(4), 5);
    }

    #[test]
    fn test_cancel_only_live() {
        assert!(ReservationService::validate_cancel(ReservationState::Active).is_ok());
        assert!(ReservationService::validate_cancel(ReservationState::Notified).is_ok());
        assert_eq!(
            ReservationService::validate_cancel(ReservationState::Expired),
            Err(ReservationError::AlreadyProcessed)
        );
        assert_eq!(
            ReservationService::validate_cancel(ReservationState::Confirmed),
            Err(ReservationError::AlreadyProcessed)
        );
    }

    #[test]
    fn test_position_shift() {
        // Entry at 2 leaves: 1 stays, 3 and 4 move up.
        assert_eq!(ReservationService::position_after_cancel(1, 2), 1);
        assert_eq!(ReservationService::position_after_cancel(3, 2), 2);
        assert_eq!(ReservationService::position_after_cancel(4, 2), 3);
    }

    #[test]
    fn test_notification_expiry() {
        let now = Utc::now();
        assert_eq!(
            ReservationService::notification_expiry(now) - now,
            Duration::days(2)
        );
    }

    #[test]
    fn test_confirm_inside_window() {
        let now = Utc::now();
        let expires = now + Duration::hours(12);
        assert_eq!(
            ReservationService::confirm_outcome(ReservationState::Notified, Some(expires), now),
            Ok(ConfirmOutcome::Confirmed)
        );
    }

    #[test]
    fn test_confirm_after_window() {
        let now = Utc::now();
        let expires = now - Duration::hours(1);
        assert_eq!(
            ReservationService::confirm_outcome(ReservationState::Notified, Some(expires), now),
            Ok(ConfirmOutcome::Expired)
        );
    }

    #[test]
    fn test_confirm_missing_deadline_lapses() {
        let now = Utc::now();
        assert_eq!(
            ReservationService::confirm_outcome(ReservationState::Notified, None, now),
            Ok(ConfirmOutcome::Expired)
        );
    }

    #[test]
    fn test_confirm_wrong_state() {
        let now = Utc::now();
        assert_eq!(
            ReservationService::confirm_outcome(ReservationState::Active, Some(now), now),
            Err(ReservationError::NotNotified)
        );
        assert_eq!(
            ReservationService::confirm_outcome(ReservationState::Cancelled, Some(now), now),
            Err(ReservationError::AlreadyProcessed)
        );
    }

    #[test]
    fn test_density_check() {
        assert!(ReservationService::positions_are_dense(&[]));
        assert!(ReservationService::positions_are_dense(&[1, 2, 3]));
        assert!(!ReservationService::positions_are_dense(&[1, 3]));
        assert!(!ReservationService::positions_are_dense(&[2, 3]));
        assert!(!ReservationService::positions_are_dense(&[1, 1, 2]));
    }
}
