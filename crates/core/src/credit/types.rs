//! Credit ledger domain types.

use serde::{Deserialize, Serialize};

/// Direction of a credit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditKind {
    /// Credits gained (positive amount).
    Earn,
    /// Credits lost (negative amount).
    Spend,
}

impl CreditKind {
    /// Classifies a signed, non-zero amount.
    #[must_use]
    pub fn from_amount(amount: i32) -> Self {
        if amount > 0 {
            Self::Earn
        } else {
            Self::Spend
        }
    }

    /// Returns the string representation stored in the ledger.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earn => "earn",
            Self::Spend => "spend",
        }
    }

    /// Parses a stored kind string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "earn" => Some(Self::Earn),
            "spend" => Some(Self::Spend),
            _ => None,
        }
    }
}

/// Stored account status.
///
/// The "warning" zone (negative balance down to -50) is NOT a stored status:
/// warned users remain `Active` and the restriction is derived from the
/// balance at decision time via [`CreditBand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account in good standing (includes the derived warning zone).
    Active,
    /// Balance fell into -100..=-51; no new loans or reservations.
    Suspended,
    /// Balance fell to -101 or below; requires administrative intervention.
    Blocked,
}

impl AccountStatus {
    /// Returns the string representation stored on the user row.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Blocked => "blocked",
        }
    }

    /// Parses a stored status string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Returns true if the status forbids new loans and reservations.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Suspended | Self::Blocked)
    }
}

/// Balance band derived from the current credit balance.
///
/// Decision logic reads the band, never a stored "warned" flag, so it can
/// never go stale when the balance moves without crossing a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditBand {
    /// Balance >= 0.
    Good,
    /// -50..=-1: may hold at most one non-completed loan.
    Warning,
    /// -100..=-51: account suspends.
    Suspended,
    /// <= -101: account blocks.
    Blocked,
}

impl CreditBand {
    /// Derives the band from a balance.
    #[must_use]
    pub fn from_balance(balance: i32) -> Self {
        if balance >= 0 {
            Self::Good
        } else if balance >= -50 {
            Self::Warning
        } else if balance >= -100 {
            Self::Suspended
        } else {
            Self::Blocked
        }
    }

    /// The stored status this band maps to.
    #[must_use]
    pub fn account_status(&self) -> AccountStatus {
        match self {
            Self::Good | Self::Warning => AccountStatus::Active,
            Self::Suspended => AccountStatus::Suspended,
            Self::Blocked => AccountStatus::Blocked,
        }
    }
}

/// The resolved effect of posting one credit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostOutcome {
    /// Signed amount posted.
    pub amount: i32,
    /// Earn or spend, derived from the sign.
    pub kind: CreditKind,
    /// Balance before the posting.
    pub balance_before: i32,
    /// Balance after the posting.
    pub balance_after: i32,
    /// Account status re-derived from `balance_after`.
    pub new_status: AccountStatus,
}

/// Minimal view of a stored transaction used for audit replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayEntry {
    /// Signed amount of the transaction.
    pub amount: i32,
    /// Balance snapshot before the transaction.
    pub balance_before: i32,
    /// Balance snapshot after the transaction.
    pub balance_after: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_amount() {
        assert_eq!(CreditKind::from_amount(10), CreditKind::Earn);
        assert_eq!(CreditKind::from_amount(-30), CreditKind::Spend);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(CreditBand::from_balance(0), CreditBand::Good);
        assert_eq!(CreditBand::from_balance(500), CreditBand::Good);
        assert_eq!(CreditBand::from_balance(-1), CreditBand::Warning);
        assert_eq!(CreditBand::from_balance(-50), CreditBand::Warning);
        assert_eq!(CreditBand::from_balance(-51), CreditBand::Suspended);
        assert_eq!(CreditBand::from_balance(-100), CreditBand::Suspended);
        assert_eq!(CreditBand::from_balance(-101), CreditBand::Blocked);
        assert_eq!(CreditBand::from_balance(i32::MIN), CreditBand::Blocked);
    }

    #[test]
    fn test_band_to_status() {
        assert_eq!(CreditBand::Good.account_status(), AccountStatus::Active);
        assert_eq!(CreditBand::Warning.account_status(), AccountStatus::Active);
        assert_eq!(
            CreditBand::Suspended.account_status(),
            AccountStatus::Suspended
        );
        assert_eq!(CreditBand::Blocked.account_status(), AccountStatus::Blocked);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            AccountStatus::Active,
            AccountStatus::Suspended,
            AccountStatus::Blocked,
        ] {
            assert_eq!(AccountStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AccountStatus::parse("warned"), None);
    }

    #[test]
    fn test_restricted() {
        assert!(!AccountStatus::Active.is_restricted());
        assert!(AccountStatus::Suspended.is_restricted());
        assert!(AccountStatus::Blocked.is_restricted());
    }
}
