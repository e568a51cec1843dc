//! Transaction repository
//!
//! Transactions are memoized and listed newest first. Mapping a record
//! needs the asset codes of the accounts it touches and the tags linked to
//! it, so the repository holds the account and tag repositories.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::WalletResult;
use crate::mapper::transaction::{to_domain, to_record};
use crate::models::{AccountId, AssetCode, CategoryId, TagId, Transaction, TransactionId};

use super::accounts::AccountRepository;
use super::map_valid;
use super::memo::RepositoryMemo;
use super::records::TransactionRecord;
use super::table::Table;
use super::tags::TagRepository;

/// Repository for transaction persistence
pub struct TransactionRepository {
    table: Box<dyn Table<TransactionRecord>>,
    memo: RepositoryMemo<Transaction>,
    accounts: Arc<AccountRepository>,
    tags: Arc<TagRepository>,
}

/// A transaction's stored row and tag links before a write
struct Snapshot {
    id: TransactionId,
    record: Option<TransactionRecord>,
    tags: Vec<TagId>,
}

fn newest_first(transactions: &mut Vec<Transaction>) {
    transactions.sort_by(|a, b| {
        b.timestamp()
            .cmp(&a.timestamp())
            .then_with(|| a.id.cmp(&b.id))
    });
}

impl TransactionRepository {
    pub fn new(
        table: Box<dyn Table<TransactionRecord>>,
        accounts: Arc<AccountRepository>,
        tags: Arc<TagRepository>,
    ) -> Self {
        Self {
            table,
            memo: RepositoryMemo::new(),
            accounts,
            tags,
        }
    }

    fn scan(&self) -> WalletResult<Vec<Transaction>> {
        let records = self.table.find_all()?;
        let assets: HashMap<AccountId, AssetCode> = self
            .accounts
            .find_all(true)?
            .into_iter()
            .map(|a| (a.id, a.asset))
            .collect();
        let tag_index = self.tags.association_index()?;

        Ok(map_valid(records, "transaction", |r| {
            let tags = tag_index.get(&r.id).cloned().unwrap_or_default();
            to_domain(r, tags, |id| assets.get(&id).cloned())
        }))
    }

    fn load(&self, id: TransactionId) -> WalletResult<Option<Transaction>> {
        let Some(record) = self.table.find_by_id(*id.as_uuid())? else {
            return Ok(None);
        };

        let mut assets = HashMap::new();
        for account in std::iter::once(record.account_id).chain(record.to_account_id) {
            let account = AccountId::from_uuid(account);
            if let Some(asset) = self.accounts.asset_of(account)? {
                assets.insert(account, asset);
            }
        }
        let tags = self.tags.find_by_association(id.into())?;

        Ok(map_valid(vec![record], "transaction", |r| {
            to_domain(r, tags.clone(), |id| assets.get(&id).cloned())
        })
        .pop())
    }

    /// All transactions, newest first
    pub fn find_all(&self, include_deleted: bool) -> WalletResult<Vec<Transaction>> {
        let transactions = self.memo.find_all(|| self.scan(), newest_first)?;
        Ok(transactions
            .into_iter()
            .filter(|t| include_deleted || !t.removed)
            .collect())
    }

    pub fn find_by_id(&self, id: TransactionId) -> WalletResult<Option<Transaction>> {
        self.memo.find_by_id(id, |id| self.load(id))
    }

    /// Active transactions touching an account on either side
    pub fn find_by_account(&self, account: AccountId) -> WalletResult<Vec<Transaction>> {
        Ok(self
            .find_all(false)?
            .into_iter()
            .filter(|t| t.kind.touches(account))
            .collect())
    }

    pub fn find_by_category(&self, category: CategoryId) -> WalletResult<Vec<Transaction>> {
        Ok(self
            .find_all(false)?
            .into_iter()
            .filter(|t| t.category == Some(category))
            .collect())
    }

    /// Active transactions whose time falls in `[from, to)`
    pub fn find_by_time_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> WalletResult<Vec<Transaction>> {
        Ok(self
            .find_all(false)?
            .into_iter()
            .filter(|t| t.timestamp() >= from && t.timestamp() < to)
            .collect())
    }

    /// Write the record, then sync its tag links. If the links cannot be
    /// written the record is put back, so backend and memo keep agreeing.
    pub fn save(&self, transaction: Transaction) -> WalletResult<()> {
        self.memo.save(transaction, |t| {
            let previous = self.snapshot(t.id)?;
            self.table.save(to_record(t))?;
            if let Err(e) = self.tags.set_associations(t.id.into(), &t.tags) {
                self.roll_back(vec![previous]);
                return Err(e);
            }
            Ok(())
        })
    }

    pub fn save_many(&self, transactions: Vec<Transaction>) -> WalletResult<()> {
        self.memo.save_many(transactions, |transactions| {
            let previous = transactions
                .iter()
                .map(|t| self.snapshot(t.id))
                .collect::<WalletResult<Vec<_>>>()?;
            self.table
                .save_many(transactions.iter().map(to_record).collect())?;
            for t in transactions {
                if let Err(e) = self.tags.set_associations(t.id.into(), &t.tags) {
                    self.roll_back(previous);
                    return Err(e);
                }
            }
            Ok(())
        })
    }

    fn snapshot(&self, id: TransactionId) -> WalletResult<Snapshot> {
        Ok(Snapshot {
            id,
            record: self.table.find_by_id(*id.as_uuid())?,
            tags: self.tags.find_by_association(id.into())?,
        })
    }

    /// Put rows and links back the way they were before a failed write
    fn roll_back(&self, snapshots: Vec<Snapshot>) {
        for snapshot in snapshots {
            let restored = match snapshot.record {
                Some(record) => self.table.save(record),
                None => self.table.delete_by_id(*snapshot.id.as_uuid()),
            };
            let relinked = self
                .tags
                .set_associations(snapshot.id.into(), &snapshot.tags);
            if let Err(e) = restored.and(relinked) {
                tracing::error!(id = %snapshot.id, error = %e, "failed to roll back transaction write");
            }
        }
    }

    /// Physically delete a transaction and its tag links.
    /// Services soft-delete instead.
    pub fn delete_by_id(&self, id: TransactionId) -> WalletResult<()> {
        self.memo.delete_by_id(id, |id| {
            self.table.delete_by_id(*id.as_uuid())?;
            self.tags.set_associations(id.into(), &[])
        })
    }

    pub fn delete_all(&self) -> WalletResult<()> {
        self.memo.delete_all(|| {
            for record in self.table.find_all()? {
                self.tags
                    .set_associations(TransactionId::from_uuid(record.id).into(), &[])?;
            }
            self.table.delete_all()
        })
    }

    /// Drop a physically deleted tag from memoized transactions
    pub fn forget_tag(&self, tag: TagId) -> WalletResult<()> {
        self.memo.update_memoized(|t| t.tags.retain(|id| *id != tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Account, Flow, NotBlankTrimmedString, PositiveAmount, Tag, TransactionKind,
        TransactionTime, Transfer, Value,
    };
    use crate::storage::records::{AccountRecord, TagAssociationRecord, TagRecord};
    use crate::storage::table::MemoryTable;
    use crate::error::WalletError;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Link table whose writes can be switched off
    #[derive(Default)]
    struct FlakyLinks {
        rows: MemoryTable<TagAssociationRecord>,
        broken: AtomicBool,
    }

    impl FlakyLinks {
        fn check(&self) -> WalletResult<()> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(WalletError::Storage("link table unavailable".into()));
            }
            Ok(())
        }
    }

    impl Table<TagAssociationRecord> for FlakyLinks {
        fn find_all(&self) -> WalletResult<Vec<TagAssociationRecord>> {
            self.rows.find_all()
        }

        fn find_by_id(&self, id: uuid::Uuid) -> WalletResult<Option<TagAssociationRecord>> {
            self.rows.find_by_id(id)
        }

        fn save(&self, record: TagAssociationRecord) -> WalletResult<()> {
            self.check()?;
            self.rows.save(record)
        }

        fn save_many(&self, records: Vec<TagAssociationRecord>) -> WalletResult<()> {
            self.check()?;
            self.rows.save_many(records)
        }

        fn delete_by_id(&self, id: uuid::Uuid) -> WalletResult<()> {
            self.check()?;
            self.rows.delete_by_id(id)
        }

        fn delete_all(&self) -> WalletResult<()> {
            self.check()?;
            self.rows.delete_all()
        }
    }

    struct Fixture {
        table: Arc<MemoryTable<TransactionRecord>>,
        tags: Arc<TagRepository>,
        cash: Account,
        savings: Account,
        repo: TransactionRepository,
    }

    fn fixture() -> Fixture {
        fixture_with_links(Box::new(MemoryTable::<TagAssociationRecord>::new()))
    }

    fn fixture_with_links(links: Box<dyn Table<TagAssociationRecord>>) -> Fixture {
        let accounts = Arc::new(AccountRepository::new(
            Box::new(MemoryTable::<AccountRecord>::new()),
            AssetCode::new("USD").unwrap(),
        ));
        let cash = Account::new(
            NotBlankTrimmedString::new("Cash").unwrap(),
            AssetCode::new("USD").unwrap(),
        );
        let savings = Account::new(
            NotBlankTrimmedString::new("Savings").unwrap(),
            AssetCode::new("EUR").unwrap(),
        );
        accounts
            .save_many(vec![cash.clone(), savings.clone()])
            .unwrap();

        let tags = Arc::new(TagRepository::new(
            Box::new(MemoryTable::<TagRecord>::new()),
            links,
        ));
        let table = Arc::new(MemoryTable::<TransactionRecord>::new());
        let repo = TransactionRepository::new(Box::new(table.clone()), accounts, tags.clone());

        Fixture {
            table,
            tags,
            cash,
            savings,
            repo,
        }
    }

    fn value(account: &Account, cents: i64) -> Value {
        Value::new(PositiveAmount::from_cents(cents).unwrap(), account.asset.clone())
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, day, 8, 0, 0).unwrap()
    }

    fn expense(fx: &Fixture, cents: i64, day: u32) -> Transaction {
        Transaction::new(
            TransactionKind::Expense(Flow::new(fx.cash.id, value(&fx.cash, cents))),
            TransactionTime::Actual(at(day)),
        )
    }

    #[test]
    fn test_save_then_find_by_id_served_from_memo() {
        let fx = fixture();
        let txn = expense(&fx, 5523, 3);
        fx.repo.save(txn.clone()).unwrap();

        let reads = fx.table.reads();
        assert_eq!(fx.repo.find_by_id(txn.id).unwrap(), Some(txn));
        assert_eq!(fx.table.reads(), reads);
    }

    #[test]
    fn test_find_all_newest_first() {
        let fx = fixture();
        fx.repo
            .save_many(vec![expense(&fx, 100, 1), expense(&fx, 200, 9), expense(&fx, 300, 5)])
            .unwrap();

        let days: Vec<_> = fx
            .repo
            .find_all(false)
            .unwrap()
            .iter()
            .map(|t| t.timestamp())
            .collect();
        assert_eq!(days, vec![at(9), at(5), at(1)]);
    }

    #[test]
    fn test_cold_repository_maps_with_account_assets_and_tags() {
        let fx = fixture();
        let trip = Tag::new(NotBlankTrimmedString::new("trip").unwrap());
        fx.tags.save(trip.clone()).unwrap();

        let transfer = Transfer::new(
            fx.cash.id,
            value(&fx.cash, 10000),
            fx.savings.id,
            value(&fx.savings, 9200),
        )
        .unwrap();
        let txn = Transaction::new(TransactionKind::Transfer(transfer), TransactionTime::Due(at(20)))
            .with_tags(vec![trip.id]);
        fx.repo.save(txn.clone()).unwrap();

        let accounts = Arc::new(AccountRepository::new(
            Box::new(MemoryTable::with_records(vec![
                crate::mapper::account::to_record(&fx.cash),
                crate::mapper::account::to_record(&fx.savings),
            ])),
            AssetCode::new("USD").unwrap(),
        ));
        let cold = TransactionRepository::new(Box::new(fx.table.clone()), accounts, fx.tags.clone());

        assert_eq!(cold.find_by_id(txn.id).unwrap(), Some(txn.clone()));
        assert_eq!(cold.find_all(false).unwrap(), vec![txn]);
    }

    #[test]
    fn test_record_with_unknown_account_is_dropped() {
        let fx = fixture();
        let good = expense(&fx, 100, 1);
        let mut orphan = to_record(&expense(&fx, 200, 2));
        orphan.account_id = uuid::Uuid::new_v4();

        fx.repo.save(good.clone()).unwrap();
        fx.table.save(orphan.clone()).unwrap();

        let cold = TransactionRepository::new(
            Box::new(fx.table.clone()),
            Arc::new(AccountRepository::new(
                Box::new(MemoryTable::with_records(vec![crate::mapper::account::to_record(
                    &fx.cash,
                )])),
                AssetCode::new("USD").unwrap(),
            )),
            fx.tags.clone(),
        );
        assert_eq!(cold.find_all(true).unwrap(), vec![good]);
        assert!(cold
            .find_by_id(TransactionId::from_uuid(orphan.id))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_save_syncs_tag_links_and_forget_tag() {
        let fx = fixture();
        let trip = Tag::new(NotBlankTrimmedString::new("trip").unwrap());
        fx.tags.save(trip.clone()).unwrap();

        let txn = expense(&fx, 100, 1).with_tags(vec![trip.id]);
        fx.repo.save(txn.clone()).unwrap();
        assert_eq!(fx.tags.find_by_association(txn.id.into()).unwrap(), vec![trip.id]);

        fx.tags.delete_by_id(trip.id).unwrap();
        fx.repo.forget_tag(trip.id).unwrap();

        assert!(fx.repo.find_by_id(txn.id).unwrap().unwrap().tags.is_empty());
    }

    #[test]
    fn test_time_range_and_account_queries() {
        let fx = fixture();
        let early = expense(&fx, 100, 1);
        let late = expense(&fx, 100, 10);
        fx.repo.save_many(vec![early.clone(), late]).unwrap();

        let in_range = fx
            .repo
            .find_by_time_range(at(1), at(1) + Duration::days(2))
            .unwrap();
        assert_eq!(in_range, vec![early]);
        assert_eq!(fx.repo.find_by_account(fx.cash.id).unwrap().len(), 2);
        assert!(fx.repo.find_by_account(fx.savings.id).unwrap().is_empty());
    }

    #[test]
    fn test_failed_tag_links_leave_stored_row_unchanged() {
        let links = Arc::new(FlakyLinks::default());
        let fx = fixture_with_links(Box::new(links.clone()));
        let trip = Tag::new(NotBlankTrimmedString::new("trip").unwrap());
        fx.tags.save(trip.clone()).unwrap();

        let original = expense(&fx, 100, 1);
        fx.repo.save(original.clone()).unwrap();

        links.broken.store(true, Ordering::SeqCst);
        let edited = original
            .clone()
            .with_title(NotBlankTrimmedString::optional(Some("Dinner")))
            .with_tags(vec![trip.id]);
        assert!(fx.repo.save(edited).is_err());

        assert_eq!(fx.repo.find_by_id(original.id).unwrap(), Some(original.clone()));
        assert_eq!(
            fx.table.find_by_id(*original.id.as_uuid()).unwrap(),
            Some(to_record(&original))
        );

        let fresh = expense(&fx, 300, 2).with_tags(vec![trip.id]);
        assert!(fx.repo.save_many(vec![fresh.clone()]).is_err());
        assert!(fx.table.find_by_id(*fresh.id.as_uuid()).unwrap().is_none());
        assert!(fx.repo.find_by_id(fresh.id).unwrap().is_none());

        links.broken.store(false, Ordering::SeqCst);
        assert_eq!(fx.repo.find_all(true).unwrap(), vec![original]);
    }
}
