//! Account service
//!
//! Account management on top of the account repository: creation with
//! duplicate checks, lookup by name or id, renaming, archiving and balance
//! calculation.

use crate::error::{WalletError, WalletResult};
use crate::models::{Account, AccountId, AssetCode, Money, NotBlankTrimmedString, TransactionKind};
use crate::storage::Storage;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// An account with its settled balance
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub account: Account,
    /// Sum of settled transactions in the account's own asset
    pub balance: Money,
    /// Number of planned transactions touching the account
    pub planned_count: usize,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account. `asset` defaults to the base currency.
    pub fn create(&self, name: &str, asset: Option<&str>) -> WalletResult<Account> {
        let name = NotBlankTrimmedString::new(name)
            .map_err(|_| WalletError::Validation("Account name cannot be empty".into()))?;

        if self.storage.accounts.find_by_name(name.as_str())?.is_some() {
            return Err(WalletError::Duplicate {
                entity_type: "Account",
                identifier: name.as_str().to_string(),
            });
        }

        let asset = match asset {
            Some(code) => AssetCode::new(code)?,
            None => self.storage.base_currency().clone(),
        };
        let order_num = self
            .storage
            .accounts
            .find_max_order_num()?
            .map_or(0.0, |max| max + 1.0);

        let account = Account::new(name, asset).with_order_num(order_num);
        self.storage.accounts.save(account.clone())?;

        tracing::info!(account = %account.name, asset = %account.asset, "account created");
        Ok(account)
    }

    pub fn get(&self, id: AccountId) -> WalletResult<Option<Account>> {
        self.storage.accounts.find_by_id(id)
    }

    /// Find an account by name or ID string
    pub fn find(&self, identifier: &str) -> WalletResult<Option<Account>> {
        if let Some(account) = self.storage.accounts.find_by_name(identifier)? {
            return Ok(Some(account));
        }

        if let Ok(id) = identifier.trim().parse::<AccountId>() {
            return self.storage.accounts.find_by_id(id);
        }

        // Short display form, e.g. "acc-1a2b3c4d"
        Ok(self
            .storage
            .accounts
            .find_all(true)?
            .into_iter()
            .find(|a| a.id.to_string() == identifier.trim()))
    }

    /// Like [`find`](Self::find) but a miss is an error
    pub fn require(&self, identifier: &str) -> WalletResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| WalletError::account_not_found(identifier))
    }

    pub fn list(&self, include_archived: bool) -> WalletResult<Vec<Account>> {
        self.storage.accounts.find_all(include_archived)
    }

    pub fn list_with_balances(&self, include_archived: bool) -> WalletResult<Vec<AccountSummary>> {
        let transactions = self.storage.transactions.find_all(false)?;
        Ok(self
            .list(include_archived)?
            .into_iter()
            .map(|account| {
                let (balance, planned_count) = balance_of(account.id, &transactions);
                AccountSummary {
                    account,
                    balance,
                    planned_count,
                }
            })
            .collect())
    }

    /// Settled balance of one account
    pub fn balance(&self, id: AccountId) -> WalletResult<Money> {
        let transactions = self.storage.transactions.find_by_account(id)?;
        Ok(balance_of(id, &transactions).0)
    }

    pub fn rename(&self, id: AccountId, new_name: &str) -> WalletResult<Account> {
        let account = self
            .get(id)?
            .ok_or_else(|| WalletError::account_not_found(id.to_string()))?;
        let name = NotBlankTrimmedString::new(new_name)
            .map_err(|_| WalletError::Validation("Account name cannot be empty".into()))?;

        if let Some(existing) = self.storage.accounts.find_by_name(name.as_str())? {
            if existing.id != id {
                return Err(WalletError::Duplicate {
                    entity_type: "Account",
                    identifier: name.as_str().to_string(),
                });
            }
        }

        let account = account.with_name(name);
        self.storage.accounts.save(account.clone())?;
        Ok(account)
    }

    /// Archive an account (soft delete)
    pub fn archive(&self, id: AccountId) -> WalletResult<Account> {
        let account = self
            .get(id)?
            .ok_or_else(|| WalletError::account_not_found(id.to_string()))?;

        if account.removed {
            return Err(WalletError::Validation("Account is already archived".into()));
        }

        let account = account.mark_removed();
        self.storage.accounts.save(account.clone())?;

        tracing::info!(account = %account.name, "account archived");
        Ok(account)
    }
}

fn balance_of(id: AccountId, transactions: &[crate::models::Transaction]) -> (Money, usize) {
    let mut balance = Money::zero();
    let mut planned = 0;
    for transaction in transactions.iter().filter(|t| t.kind.touches(id)) {
        if !transaction.settled() {
            planned += 1;
            continue;
        }
        balance += match &transaction.kind {
            TransactionKind::Income(flow) => flow.value.money(),
            TransactionKind::Expense(flow) => -flow.value.money(),
            TransactionKind::Transfer(t) if t.from_account() == id => -t.from_value().money(),
            TransactionKind::Transfer(t) => t.to_value().money(),
        };
    }
    (balance, planned)
}
