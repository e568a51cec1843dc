//! Account repository
//!
//! Accounts are memoized and sorted by their manual order. Records without
//! a currency map with the configured base currency.

use crate::error::WalletResult;
use crate::mapper::account::{to_domain, to_record};
use crate::models::{Account, AccountId, AssetCode};

use super::memo::RepositoryMemo;
use super::records::AccountRecord;
use super::table::Table;
use super::map_valid;

/// Repository for account persistence
pub struct AccountRepository {
    table: Box<dyn Table<AccountRecord>>,
    memo: RepositoryMemo<Account>,
    base: AssetCode,
}

fn by_order(accounts: &mut Vec<Account>) {
    accounts.sort_by(|a, b| {
        a.order_num
            .total_cmp(&b.order_num)
            .then_with(|| a.name.cmp(&b.name))
    });
}

impl AccountRepository {
    /// Create a repository over `table`; `base` fills in missing currencies
    pub fn new(table: Box<dyn Table<AccountRecord>>, base: AssetCode) -> Self {
        Self {
            table,
            memo: RepositoryMemo::new(),
            base,
        }
    }

    fn scan(&self) -> WalletResult<Vec<Account>> {
        let records = self.table.find_all()?;
        Ok(map_valid(records, "account", |r| to_domain(r, &self.base)))
    }

    /// All accounts in manual order
    pub fn find_all(&self, include_deleted: bool) -> WalletResult<Vec<Account>> {
        let accounts = self.memo.find_all(|| self.scan(), by_order)?;
        Ok(accounts
            .into_iter()
            .filter(|a| include_deleted || !a.removed)
            .collect())
    }

    pub fn find_by_id(&self, id: AccountId) -> WalletResult<Option<Account>> {
        self.memo.find_by_id(id, |id| {
            let record = self.table.find_by_id(*id.as_uuid())?;
            Ok(record.and_then(|r| map_valid(vec![r], "account", |r| to_domain(r, &self.base)).pop()))
        })
    }

    /// Find an active account by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> WalletResult<Option<Account>> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .find_all(false)?
            .into_iter()
            .find(|a| a.name.as_str().to_lowercase() == name_lower))
    }

    /// Asset code of an account, removed accounts included
    pub fn asset_of(&self, id: AccountId) -> WalletResult<Option<AssetCode>> {
        Ok(self.find_by_id(id)?.map(|a| a.asset))
    }

    pub fn find_max_order_num(&self) -> WalletResult<Option<f64>> {
        Ok(self
            .find_all(true)?
            .iter()
            .map(|a| a.order_num)
            .max_by(f64::total_cmp))
    }

    /// Insert or update an account
    pub fn save(&self, account: Account) -> WalletResult<()> {
        self.memo
            .save(account, |a| self.table.save(to_record(a)))
    }

    pub fn save_many(&self, accounts: Vec<Account>) -> WalletResult<()> {
        self.memo.save_many(accounts, |accounts| {
            self.table
                .save_many(accounts.iter().map(to_record).collect())
        })
    }

    /// Physically delete an account row. Services archive instead.
    pub fn delete_by_id(&self, id: AccountId) -> WalletResult<()> {
        self.memo
            .delete_by_id(id, |id| self.table.delete_by_id(*id.as_uuid()))
    }

    pub fn delete_all(&self) -> WalletResult<()> {
        self.memo.delete_all(|| self.table.delete_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotBlankTrimmedString;
    use crate::storage::table::MemoryTable;
    use std::sync::Arc;
    use uuid::Uuid;

    fn account(name: &str, asset: &str, order: f64) -> Account {
        Account::new(
            NotBlankTrimmedString::new(name).unwrap(),
            AssetCode::new(asset).unwrap(),
        )
        .with_order_num(order)
    }

    fn repo() -> (Arc<MemoryTable<AccountRecord>>, AccountRepository) {
        let table = Arc::new(MemoryTable::<AccountRecord>::new());
        let repo = AccountRepository::new(Box::new(table.clone()), AssetCode::new("USD").unwrap());
        (table, repo)
    }

    #[test]
    fn test_save_then_find_by_id_hits_memo() {
        let (table, repo) = repo();
        let cash = account("Cash", "USD", 0.0);
        repo.save(cash.clone()).unwrap();

        let reads = table.reads();
        assert_eq!(repo.find_by_id(cash.id).unwrap(), Some(cash));
        assert_eq!(table.reads(), reads);
    }

    #[test]
    fn test_find_all_sorted_and_filtered() {
        let (_table, repo) = repo();
        let savings = account("Savings", "EUR", 2.0);
        let cash = account("Cash", "USD", 1.0);
        let old = account("Old", "USD", 0.0).mark_removed();
        repo.save_many(vec![savings, cash, old]).unwrap();

        let names: Vec<_> = repo
            .find_all(false)
            .unwrap()
            .into_iter()
            .map(|a| a.name.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["Cash", "Savings"]);
        assert_eq!(repo.find_all(true).unwrap().len(), 3);
    }

    #[test]
    fn test_unmappable_record_is_dropped() {
        let good = to_record(&account("Cash", "USD", 0.0));
        let blank = AccountRecord {
            id: Uuid::new_v4(),
            name: "  ".into(),
            ..good.clone()
        };
        let table = MemoryTable::with_records(vec![good, blank.clone()]);
        let repo = AccountRepository::new(Box::new(table), AssetCode::new("USD").unwrap());

        assert_eq!(repo.find_all(true).unwrap().len(), 1);
        assert!(repo
            .find_by_id(AccountId::from_uuid(blank.id))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_full_scan_served_from_memo() {
        let (table, repo) = repo();
        repo.save(account("Cash", "USD", 0.0)).unwrap();

        repo.find_all(false).unwrap();
        let reads = table.reads();
        repo.find_all(false).unwrap();
        repo.find_by_name("cash").unwrap();
        assert_eq!(table.reads(), reads);
    }

    #[test]
    fn test_delete_all_keeps_memo_consistent() {
        let (_table, repo) = repo();
        repo.save(account("Cash", "USD", 0.0)).unwrap();
        repo.find_all(true).unwrap();

        repo.delete_all().unwrap();
        assert!(repo.find_all(true).unwrap().is_empty());

        let card = account("Card", "USD", 1.0);
        repo.save(card.clone()).unwrap();
        assert_eq!(repo.find_all(true).unwrap(), vec![card]);
    }
}
