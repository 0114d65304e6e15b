//! Reservation queue rules.
//!
//! Each book on loan carries a FIFO waiting queue with dense
//! 1-based positions. When the book comes back the queue head is
//! notified and gets a fixed confirmation window to claim it.

mod error;
mod service;
mod types;

pub use error::ReservationError;
pub use service::ReservationService;
pub use types::{ConfirmOutcome, ReservationState, CONFIRMATION_WINDOW_DAYS};

#[cfg(test)]
mod service_props;
