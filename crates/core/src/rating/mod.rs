//! Post-loan ratings.
//!
//! After a loan completes, the borrower may rate the experience once per
//! category. The ratee is always the book's donor.

mod error;
mod service;
mod types;

pub use error::RatingError;
pub use service::RatingService;
pub use types::{RatingCategory, MAX_SCORE, MIN_SCORE};
