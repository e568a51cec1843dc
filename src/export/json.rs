//! JSON Export functionality
//!
//! Exports the complete ledger to JSON format with schema versioning.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};
use crate::models::{Account, Category, Tag, Transaction};
use crate::storage::records::ExchangeRateRecord;
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full ledger export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub base_currency: String,

    /// All accounts, archived ones included
    pub accounts: Vec<Account>,

    pub categories: Vec<Category>,

    pub transactions: Vec<Transaction>,

    pub tags: Vec<Tag>,

    #[serde(default)]
    pub exchange_rates: Vec<ExchangeRateRecord>,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub account_count: usize,
    pub category_count: usize,
    pub transaction_count: usize,
    pub tag_count: usize,

    /// Earliest transaction time
    pub earliest_transaction: Option<DateTime<Utc>>,

    /// Latest transaction time
    pub latest_transaction: Option<DateTime<Utc>>,
}

impl FullExport {
    /// Snapshot everything in `storage`, soft-deleted entities included
    pub fn from_storage(storage: &Storage) -> WalletResult<Self> {
        let accounts = storage.accounts.find_all(true)?;
        let categories = storage.categories.find_all(true)?;
        let transactions = storage.transactions.find_all(true)?;
        let tags = storage.tags.find_all(true)?;
        let exchange_rates = storage.rates.list()?;

        let metadata = ExportMetadata {
            account_count: accounts.len(),
            category_count: categories.len(),
            transaction_count: transactions.len(),
            tag_count: tags.len(),
            earliest_transaction: transactions.iter().map(Transaction::timestamp).min(),
            latest_transaction: transactions.iter().map(Transaction::timestamp).max(),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            base_currency: storage.base_currency().as_str().to_string(),
            accounts,
            categories,
            transactions,
            tags,
            exchange_rates,
            metadata,
        })
    }

    /// Check the schema version and that transactions only reference
    /// exported accounts, categories and tags
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let account_ids: HashSet<_> = self.accounts.iter().map(|a| a.id).collect();
        let category_ids: HashSet<_> = self.categories.iter().map(|c| c.id).collect();
        let tag_ids: HashSet<_> = self.tags.iter().map(|t| t.id).collect();

        for txn in &self.transactions {
            let mut referenced = vec![txn.kind.primary_account()];
            referenced.extend(txn.kind.to_account());
            if let Some(missing) = referenced.iter().find(|a| !account_ids.contains(*a)) {
                return Err(format!(
                    "Transaction {} references unknown account {}",
                    txn.id, missing
                ));
            }
            if let Some(cat_id) = txn.category {
                if !category_ids.contains(&cat_id) {
                    return Err(format!(
                        "Transaction {} references unknown category {}",
                        txn.id, cat_id
                    ));
                }
            }
            if let Some(tag) = txn.tags.iter().find(|t| !tag_ids.contains(*t)) {
                return Err(format!(
                    "Transaction {} references unknown tag {}",
                    txn.id, tag
                ));
            }
        }

        Ok(())
    }
}

/// Export the full ledger to JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W, pretty: bool) -> WalletResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| WalletError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and validate a JSON export
pub fn import_from_json(json_str: &str) -> WalletResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| WalletError::Import(e.to_string()))?;

    export.validate().map_err(WalletError::Import)?;

    Ok(export)
}
