//! Storage layer for walletbook
//!
//! Each entity type has a [`Table`] backend (a JSON file, or memory in
//! tests) and a repository that maps records to domain entities and memoizes
//! them. [`Storage`] wires the repositories together.

pub mod accounts;
pub mod categories;
pub mod file_io;
pub mod memo;
pub mod rates;
pub mod records;
pub mod table;
pub mod tags;
pub mod templates;
pub mod transactions;

pub use accounts::AccountRepository;
pub use categories::CategoryRepository;
pub use file_io::{load_table_file, store_table_file};
pub use memo::{Identified, RepositoryMemo};
pub use rates::ExchangeRateStore;
pub use table::{JsonTable, MemoryTable, Table};
pub use tags::TagRepository;
pub use templates::TemplateStore;
pub use transactions::TransactionRepository;

use std::sync::Arc;

use crate::config::{Settings, WalletPaths};
use crate::error::WalletResult;
use crate::mapper::MappingError;
use crate::models::AssetCode;
use crate::rates::ExchangeRates;
use crate::reports::ReportTemplate;

use records::{
    AccountRecord, CategoryRecord, ExchangeRateRecord, TagAssociationRecord, TagRecord,
    TransactionRecord,
};

/// Map records, dropping and logging the ones that fail
pub(crate) fn map_valid<R, V, F>(records: Vec<R>, entity: &'static str, map: F) -> Vec<V>
where
    F: Fn(&R) -> Result<V, MappingError>,
{
    let scanned = records.len();
    let mapped: Vec<V> = records
        .iter()
        .filter_map(|record| match map(record) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(entity, error = %e, "dropping unreadable record");
                None
            }
        })
        .collect();
    tracing::debug!(entity, scanned, mapped = mapped.len(), "records mapped");
    mapped
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: Option<WalletPaths>,
    base: AssetCode,
    pub accounts: Arc<AccountRepository>,
    pub categories: CategoryRepository,
    pub tags: Arc<TagRepository>,
    pub transactions: TransactionRepository,
    pub rates: ExchangeRateStore,
    pub templates: TemplateStore,
}

impl Storage {
    /// Open the JSON-file backed storage under `paths`
    pub fn new(paths: WalletPaths, settings: &Settings) -> WalletResult<Self> {
        paths.ensure_directories()?;
        let base = settings.base_asset()?;

        let accounts = Arc::new(AccountRepository::new(
            Box::new(JsonTable::new(paths.accounts_file())),
            base.clone(),
        ));
        let tags = Arc::new(TagRepository::new(
            Box::new(JsonTable::new(paths.tags_file())),
            Box::new(JsonTable::new(paths.tag_associations_file())),
        ));

        Ok(Self {
            categories: CategoryRepository::new(Box::new(JsonTable::new(
                paths.categories_file(),
            ))),
            transactions: TransactionRepository::new(
                Box::new(JsonTable::new(paths.transactions_file())),
                accounts.clone(),
                tags.clone(),
            ),
            rates: ExchangeRateStore::new(Box::new(JsonTable::new(paths.exchange_rates_file()))),
            templates: TemplateStore::new(Box::new(JsonTable::new(
                paths.report_templates_file(),
            ))),
            accounts,
            tags,
            base,
            paths: Some(paths),
        })
    }

    /// The same repository stack over in-memory tables
    pub fn in_memory(base: AssetCode) -> Self {
        let accounts = Arc::new(AccountRepository::new(
            Box::new(MemoryTable::<AccountRecord>::new()),
            base.clone(),
        ));
        let tags = Arc::new(TagRepository::new(
            Box::new(MemoryTable::<TagRecord>::new()),
            Box::new(MemoryTable::<TagAssociationRecord>::new()),
        ));

        Self {
            categories: CategoryRepository::new(Box::new(MemoryTable::<CategoryRecord>::new())),
            transactions: TransactionRepository::new(
                Box::new(MemoryTable::<TransactionRecord>::new()),
                accounts.clone(),
                tags.clone(),
            ),
            rates: ExchangeRateStore::new(Box::new(MemoryTable::<ExchangeRateRecord>::new())),
            templates: TemplateStore::new(Box::new(MemoryTable::<ReportTemplate>::new())),
            accounts,
            tags,
            base,
            paths: None,
        }
    }

    /// Paths of the backing files; `None` for in-memory storage
    pub fn paths(&self) -> Option<&WalletPaths> {
        self.paths.as_ref()
    }

    pub fn base_currency(&self) -> &AssetCode {
        &self.base
    }

    /// Stored rates quoted around the base currency
    pub fn exchange_rates(&self) -> WalletResult<ExchangeRates> {
        self.rates.rates(&self.base)
    }
}
