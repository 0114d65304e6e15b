//! Credit ledger domain logic.
//!
//! Balances are plain signed integers. Every balance change is represented
//! by an append-only transaction carrying before/after snapshots, and the
//! account status is re-derived from the balance on every posting.

mod error;
mod service;
mod types;

#[cfg(test)]
mod service_props;

pub use error::CreditError;
pub use service::CreditService;
pub use types::{AccountStatus, CreditBand, CreditKind, PostOutcome, ReplayEntry};
