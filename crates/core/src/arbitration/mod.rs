//! Approval arbitration for loan requests.
//!
//! When an administrator approves a pending request the engine re-checks
//! everything that may have drifted since submission: request state, book
//! state, and the requester's credit standing. Standing violations reject
//! the request terminally; stale-state failures leave it pending.

mod error;
mod service;
mod types;

pub use error::ArbitrationError;
pub use service::ArbitrationService;
pub use types::{Decision, EligibilityInput, RequestState};
