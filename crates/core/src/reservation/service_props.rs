//! Property-based tests for the reservation queue.

use proptest::prelude::*;

use super::service::ReservationService;

proptest! {
    /// A freshly built queue of any length has dense 1-based positions.
    #[test]
    fn sequential_enqueues_stay_dense(len in 0usize..50) {
        let mut positions = Vec::with_capacity(len);
        for _ in 0..len {
            positions.push(ReservationService::next_position(positions.len() as u64));
        }
        prop_assert!(ReservationService::positions_are_dense(&positions));
    }

    /// Cancelling any entry and shifting the rest leaves the queue dense
    /// and preserves relative order.
    #[test]
    fn cancel_preserves_density_and_order(len in 1usize..50, pick in 0usize..50) {
        let len = len.max(1);
        let cancelled = (pick % len) as i32 + 1;

        let mut remaining: Vec<i32> = (1..=len as i32)
            .filter(|&p| p != cancelled)
            .map(|p| ReservationService::position_after_cancel(p, cancelled))
            .collect();

        prop_assert!(ReservationService::positions_are_dense(&remaining));
        remaining.sort_unstable();
        prop_assert!(ReservationService::positions_are_dense(&remaining));
    }

    /// Repeated cancellations from arbitrary positions never break density.
    #[test]
    fn repeated_cancels_stay_dense(len in 1usize..30, picks in prop::collection::vec(0usize..30, 0..10)) {
        let mut queue: Vec<i32> = (1..=len as i32).collect();
        for pick in picks {
            if queue.is_empty() {
                break;
            }
            let cancelled = queue[pick % queue.len()];
            queue = queue
                .into_iter()
                .filter(|&p| p != cancelled)
                .map(|p| ReservationService::position_after_cancel(p, cancelled))
                .collect();
            prop_assert!(ReservationService::positions_are_dense(&queue));
        }
    }
}
