//! Persistence backends
//!
//! A [`Table`] is the row store behind a repository: look up by id, full
//! scan, upsert, delete. Two implementations ship with the crate: a JSON
//! file per table for real use and an in-memory map for tests and
//! `Storage::in_memory`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WalletError, WalletResult};

use super::file_io::{load_table_file, store_table_file};
use super::records::Record;

/// Row store for one record type
pub trait Table<R: Record>: Send + Sync {
    /// Every row, including soft-deleted ones
    fn find_all(&self) -> WalletResult<Vec<R>>;

    fn find_by_id(&self, id: Uuid) -> WalletResult<Option<R>>;

    /// Insert or replace by id
    fn save(&self, record: R) -> WalletResult<()>;

    fn save_many(&self, records: Vec<R>) -> WalletResult<()>;

    fn delete_by_id(&self, id: Uuid) -> WalletResult<()>;

    fn delete_all(&self) -> WalletResult<()>;
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "R: Record")]
struct TableData<R> {
    records: Vec<R>,
}

impl<R> Default for TableData<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

/// A table stored as one JSON file, rewritten atomically on each change
pub struct JsonTable<R> {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
    _marker: std::marker::PhantomData<fn() -> R>,
}

impl<R: Record> JsonTable<R> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn modify<F>(&self, f: F) -> WalletResult<()>
    where
        F: FnOnce(&mut Vec<R>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire table lock: {}", e)))?;

        let mut data: TableData<R> = load_table_file(&self.path)?;
        f(&mut data.records);
        store_table_file(&self.path, &data)
    }

    fn read(&self) -> WalletResult<Vec<R>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire table lock: {}", e)))?;

        let data: TableData<R> = load_table_file(&self.path)?;
        Ok(data.records)
    }
}

fn upsert<R: Record>(records: &mut Vec<R>, record: R) {
    match records.iter_mut().find(|r| r.id() == record.id()) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

impl<R: Record> Table<R> for JsonTable<R> {
    fn find_all(&self) -> WalletResult<Vec<R>> {
        self.read()
    }

    fn find_by_id(&self, id: Uuid) -> WalletResult<Option<R>> {
        Ok(self.read()?.into_iter().find(|r| r.id() == id))
    }

    fn save(&self, record: R) -> WalletResult<()> {
        self.modify(|records| upsert(records, record))
    }

    fn save_many(&self, new_records: Vec<R>) -> WalletResult<()> {
        if new_records.is_empty() {
            return Ok(());
        }
        self.modify(|records| {
            for record in new_records {
                upsert(records, record);
            }
        })
    }

    fn delete_by_id(&self, id: Uuid) -> WalletResult<()> {
        self.modify(|records| records.retain(|r| r.id() != id))
    }

    fn delete_all(&self) -> WalletResult<()> {
        self.modify(|records| records.clear())
    }
}

/// A table held in process memory
///
/// Counts backend reads so callers can tell a cache hit from a table hit.
pub struct MemoryTable<R> {
    rows: RwLock<BTreeMap<Uuid, R>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl<R: Record> MemoryTable<R> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seed rows without counting a write
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let table = Self::new();
        if let Ok(mut rows) = table.rows.write() {
            rows.extend(records.into_iter().map(|r| (r.id(), r)));
        }
        table
    }

    /// Number of `find_all` and `find_by_id` calls served so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read_rows(&self) -> WalletResult<std::sync::RwLockReadGuard<'_, BTreeMap<Uuid, R>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.rows
            .read()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_rows(&self) -> WalletResult<std::sync::RwLockWriteGuard<'_, BTreeMap<Uuid, R>>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.rows
            .write()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

impl<R: Record> Default for MemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Table<R> for MemoryTable<R> {
    fn find_all(&self) -> WalletResult<Vec<R>> {
        Ok(self.read_rows()?.values().cloned().collect())
    }

    fn find_by_id(&self, id: Uuid) -> WalletResult<Option<R>> {
        Ok(self.read_rows()?.get(&id).cloned())
    }

    fn save(&self, record: R) -> WalletResult<()> {
        self.write_rows()?.insert(record.id(), record);
        Ok(())
    }

    fn save_many(&self, records: Vec<R>) -> WalletResult<()> {
        let mut rows = self.write_rows()?;
        for record in records {
            rows.insert(record.id(), record);
        }
        Ok(())
    }

    fn delete_by_id(&self, id: Uuid) -> WalletResult<()> {
        self.write_rows()?.remove(&id);
        Ok(())
    }

    fn delete_all(&self) -> WalletResult<()> {
        self.write_rows()?.clear();
        Ok(())
    }
}

/// Lets a test keep a handle on a table it also hands to a repository
impl<R: Record, T: Table<R>> Table<R> for std::sync::Arc<T> {
    fn find_all(&self) -> WalletResult<Vec<R>> {
        (**self).find_all()
    }

    fn find_by_id(&self, id: Uuid) -> WalletResult<Option<R>> {
        (**self).find_by_id(id)
    }

    fn save(&self, record: R) -> WalletResult<()> {
        (**self).save(record)
    }

    fn save_many(&self, records: Vec<R>) -> WalletResult<()> {
        (**self).save_many(records)
    }

    fn delete_by_id(&self, id: Uuid) -> WalletResult<()> {
        (**self).delete_by_id(id)
    }

    fn delete_all(&self) -> WalletResult<()> {
        (**self).delete_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::CategoryRecord;
    use tempfile::TempDir;

    fn record(name: &str) -> CategoryRecord {
        CategoryRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: 0,
            icon: None,
            order_num: 0.0,
            is_deleted: false,
            last_updated: None,
        }
    }

    #[test]
    fn test_json_table_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let table: JsonTable<CategoryRecord> =
            JsonTable::new(temp_dir.path().join("categories.json"));
        assert!(table.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_json_table_upsert_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let table = JsonTable::new(temp_dir.path().join("categories.json"));

        let mut food = record("Food");
        let rent = record("Rent");
        table.save_many(vec![food.clone(), rent.clone()]).unwrap();

        food.name = "Groceries".to_string();
        table.save(food.clone()).unwrap();

        let all = table.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(table.find_by_id(food.id).unwrap().unwrap().name, "Groceries");

        table.delete_by_id(rent.id).unwrap();
        assert!(table.find_by_id(rent.id).unwrap().is_none());

        table.delete_all().unwrap();
        assert!(table.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_json_table_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("categories.json");
        let food = record("Food");

        JsonTable::new(path.clone()).save(food.clone()).unwrap();

        let reopened: JsonTable<CategoryRecord> = JsonTable::new(path);
        assert_eq!(reopened.find_by_id(food.id).unwrap(), Some(food));
    }

    #[test]
    fn test_memory_table_counts_reads_and_writes() {
        let table = MemoryTable::with_records(vec![record("Food")]);
        assert_eq!(table.reads(), 0);

        table.find_all().unwrap();
        table.find_by_id(Uuid::new_v4()).unwrap();
        table.save(record("Rent")).unwrap();

        assert_eq!(table.reads(), 2);
        assert_eq!(table.writes(), 1);
    }
}
