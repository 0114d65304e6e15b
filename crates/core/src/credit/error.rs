//! Credit ledger error types.

use thiserror::Error;

/// Errors that can occur during credit ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreditError {
    /// Zero-amount postings are not recorded.
    #[error("Transaction amount cannot be zero")]
    ZeroAmount,

    /// A transaction's before-snapshot does not chain with its predecessor.
    #[error("Ledger chain broken at entry {index}: expected balance-before {expected}, found {actual}")]
    BrokenChain {
        /// Zero-based index of the offending entry in timestamp order.
        index: usize,
        /// Balance the predecessor left behind.
        expected: i32,
        /// Balance-before snapshot actually recorded.
        actual: i32,
    },

    /// An entry's own arithmetic is inconsistent (before + amount != after).
    #[error("Ledger entry {index} is inconsistent: {before} + {amount} != {after}")]
    InconsistentEntry {
        /// Zero-based index of the offending entry.
        index: usize,
        /// Recorded balance-before.
        before: i32,
        /// Recorded signed amount.
        amount: i32,
        /// Recorded balance-after.
        after: i32,
    },
}

impl CreditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::BrokenChain { .. } => "LEDGER_CHAIN_BROKEN",
            Self::InconsistentEntry { .. } => "LEDGER_ENTRY_INCONSISTENT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ZeroAmount => 400,
            // Chain damage is a server-side integrity failure.
            Self::BrokenChain { .. } | Self::InconsistentEntry { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CreditError::ZeroAmount.error_code(), "ZERO_AMOUNT");
        assert_eq!(
            CreditError::BrokenChain {
                index: 2,
                expected: 10,
                actual: 5
            }
            .error_code(),
            "LEDGER_CHAIN_BROKEN"
        );
    }

    #[test]
    fn test_error_display() {
        let err = CreditError::BrokenChain {
            index: 2,
            expected: 10,
            actual: 5,
        };
        assert_eq!(
            err.to_string(),
            "Ledger chain broken at entry 2: expected balance-before 10, found 5"
        );
    }
}
