//! Account model
//!
//! An account holds money in exactly one asset (currency). Transactions
//! inherit their asset code from the account they touch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;
use super::primitives::{AssetCode, NotBlankTrimmedString};

/// A financial account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    /// Display name (e.g., "Cash", "Revolut EUR")
    pub name: NotBlankTrimmedString,

    /// Currency the account is denominated in
    pub asset: AssetCode,

    /// ARGB color used by front ends
    pub color: i32,

    pub icon: Option<String>,

    /// Whether the account counts toward the total balance
    pub include_in_balance: bool,

    /// Manual sort position
    pub order_num: f64,

    /// Soft-delete flag
    pub removed: bool,

    pub last_updated: DateTime<Utc>,
}

impl Account {
    /// Create a new account with default values
    pub fn new(name: NotBlankTrimmedString, asset: AssetCode) -> Self {
        Self {
            id: AccountId::new(),
            name,
            asset,
            color: 0,
            icon: None,
            include_in_balance: true,
            order_num: 0.0,
            removed: false,
            last_updated: Utc::now(),
        }
    }

    pub fn with_order_num(mut self, order_num: f64) -> Self {
        self.order_num = order_num;
        self
    }

    pub fn with_name(mut self, name: NotBlankTrimmedString) -> Self {
        self.name = name;
        self.last_updated = Utc::now();
        self
    }

    /// Returns a copy flagged as removed
    pub fn mark_removed(mut self) -> Self {
        self.removed = true;
        self.last_updated = Utc::now();
        self
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            NotBlankTrimmedString::new("Cash").unwrap(),
            AssetCode::new("usd").unwrap(),
        )
    }

    #[test]
    fn test_new_account_defaults() {
        let acc = account();
        assert_eq!(acc.name.as_str(), "Cash");
        assert_eq!(acc.asset.as_str(), "USD");
        assert!(acc.include_in_balance);
        assert!(!acc.removed);
    }

    #[test]
    fn test_mark_removed_returns_copy() {
        let acc = account();
        let removed = acc.clone().mark_removed();
        assert!(removed.removed);
        assert!(!acc.removed);
        assert_eq!(removed.id, acc.id);
    }

    #[test]
    fn test_display() {
        assert_eq!(account().to_string(), "Cash (USD)");
    }
}
