//! `SeaORM` entity definitions.
//!
//! Status and category columns are stored as text; the canonical values
//! live in the `shelfshare-core` enums and are converted at the
//! repository boundary.

pub mod books;
pub mod credit_transactions;
pub mod loan_requests;
pub mod loans;
pub mod ratings;
pub mod reservations;
pub mod users;
