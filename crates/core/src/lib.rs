//! Core lending engine logic for Shelfshare.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here; the
//! repositories in `shelfshare-db` feed these functions snapshots of stored
//! state and apply the outcomes inside a single database transaction.
//!
//! # Modules
//!
//! - `credit` - Credit ledger math, account-status banding, audit replay
//! - `loan` - Loan state machine: open, renew, return, derived overdue
//! - `reservation` - Per-book FIFO wait-list rules
//! - `arbitration` - Loan-request eligibility and approval/rejection rules
//! - `reputation` - Derived reading levels, achievements, leaderboard rules
//! - `rating` - Peer rating validation

pub mod arbitration;
pub mod credit;
pub mod loan;
pub mod rating;
pub mod reputation;
pub mod reservation;
