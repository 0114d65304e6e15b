//! Loan lifecycle state machine.
//!
//! `requested -> active -> {overdue, completed}`; overdue is never stored,
//! it is derived from the due date whenever the loan is inspected.

mod error;
mod service;
mod types;

#[cfg(test)]
mod service_props;

pub use error::LoanError;
pub use service::LoanService;
pub use types::{
    BookCondition, EffectiveLoanState, LoanState, RenewalActor, LOAN_PERIOD_DAYS, MAX_RENEWALS,
    RENEWAL_COST,
};
