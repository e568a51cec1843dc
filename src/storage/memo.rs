//! Read-through, write-through entity cache
//!
//! Each repository owns one [`RepositoryMemo`]. Reads are served from the
//! memo when possible and fall back to the backend; writes go to the backend
//! first and update the memo in place only once the backend call succeeded.
//!
//! The entry map and the `full_scan_done` flag share one lock. Writers hold
//! the write lock across the backend call and the memo update, so no reader
//! sees a memo entry whose backend write has not completed, and a cache
//! miss cannot race a delete into re-inserting a stale row.
//!
//! Writes never invalidate wholesale. Once a full scan has populated the
//! memo it stays authoritative: every later save, delete or delete-all keeps
//! it equal to the backend.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{WalletError, WalletResult};
use crate::models::{
    Account, AccountId, Category, CategoryId, Tag, TagId, Transaction, TransactionId,
};

/// An entity with a stable identity to key the memo by
pub trait Identified: Clone + Send + Sync {
    type Id: Copy + Eq + Hash + Debug + Send + Sync;

    fn identity(&self) -> Self::Id;
}

impl Identified for Account {
    type Id = AccountId;

    fn identity(&self) -> AccountId {
        self.id
    }
}

impl Identified for Category {
    type Id = CategoryId;

    fn identity(&self) -> CategoryId {
        self.id
    }
}

impl Identified for Tag {
    type Id = TagId;

    fn identity(&self) -> TagId {
        self.id
    }
}

impl Identified for Transaction {
    type Id = TransactionId;

    fn identity(&self) -> TransactionId {
        self.id
    }
}

struct MemoState<V: Identified> {
    items: HashMap<V::Id, V>,
    full_scan_done: bool,
}

pub struct RepositoryMemo<V: Identified> {
    state: RwLock<MemoState<V>>,
}

impl<V: Identified> Default for RepositoryMemo<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Identified> RepositoryMemo<V> {
    /// Create an empty memo; the first `find_all` will scan the backend
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoState {
                items: HashMap::new(),
                full_scan_done: false,
            }),
        }
    }

    fn read_state(&self) -> WalletResult<RwLockReadGuard<'_, MemoState<V>>> {
        self.state
            .read()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_state(&self) -> WalletResult<RwLockWriteGuard<'_, MemoState<V>>> {
        self.state
            .write()
            .map_err(|e| WalletError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// All memoized entities, scanning the backend on first use
    pub fn find_all<S, O>(&self, scan: S, sort: O) -> WalletResult<Vec<V>>
    where
        S: FnOnce() -> WalletResult<Vec<V>>,
        O: Fn(&mut Vec<V>),
    {
        {
            let state = self.read_state()?;
            if state.full_scan_done {
                let mut items: Vec<V> = state.items.values().cloned().collect();
                sort(&mut items);
                return Ok(items);
            }
        }

        let mut state = self.write_state()?;
        // Another caller may have finished the scan while we waited
        if !state.full_scan_done {
            let scanned = scan()?;
            tracing::debug!(entities = scanned.len(), "memo populated by full scan");
            for item in scanned {
                state.items.insert(item.identity(), item);
            }
            state.full_scan_done = true;
        }

        let mut items: Vec<V> = state.items.values().cloned().collect();
        sort(&mut items);
        Ok(items)
    }

    /// A memoized entity, loading and memoizing it on a miss
    pub fn find_by_id<L>(&self, id: V::Id, load: L) -> WalletResult<Option<V>>
    where
        L: FnOnce(V::Id) -> WalletResult<Option<V>>,
    {
        {
            let state = self.read_state()?;
            if let Some(item) = state.items.get(&id) {
                return Ok(Some(item.clone()));
            }
            // After a full scan the memo holds every entity that maps
            if state.full_scan_done {
                return Ok(None);
            }
        }

        let mut state = self.write_state()?;
        if let Some(item) = state.items.get(&id) {
            return Ok(Some(item.clone()));
        }

        let loaded = load(id)?;
        if let Some(item) = &loaded {
            state.items.insert(id, item.clone());
        }
        Ok(loaded)
    }

    /// Write through to the backend, then memoize
    pub fn save<W>(&self, value: V, write: W) -> WalletResult<()>
    where
        W: FnOnce(&V) -> WalletResult<()>,
    {
        let mut state = self.write_state()?;
        write(&value)?;
        state.items.insert(value.identity(), value);
        Ok(())
    }

    pub fn save_many<W>(&self, values: Vec<V>, write: W) -> WalletResult<()>
    where
        W: FnOnce(&[V]) -> WalletResult<()>,
    {
        let mut state = self.write_state()?;
        write(&values)?;
        for value in values {
            state.items.insert(value.identity(), value);
        }
        Ok(())
    }

    pub fn delete_by_id<W>(&self, id: V::Id, write: W) -> WalletResult<()>
    where
        W: FnOnce(V::Id) -> WalletResult<()>,
    {
        let mut state = self.write_state()?;
        write(id)?;
        state.items.remove(&id);
        Ok(())
    }

    /// Clear backend and memo together. The memo stays marked as fully
    /// scanned since an empty memo matches an empty backend.
    pub fn delete_all<W>(&self, write: W) -> WalletResult<()>
    where
        W: FnOnce() -> WalletResult<()>,
    {
        let mut state = self.write_state()?;
        write()?;
        state.items.clear();
        state.full_scan_done = true;
        Ok(())
    }

    /// Rewrite memoized entries after a change the backend already holds
    pub fn update_memoized<F>(&self, mut update: F) -> WalletResult<()>
    where
        F: FnMut(&mut V),
    {
        let mut state = self.write_state()?;
        state.items.values_mut().for_each(|item| update(item));
        Ok(())
    }

    pub fn find_all_memoized(&self) -> bool {
        self.read_state().map(|s| s.full_scan_done).unwrap_or(false)
    }

    /// Current memo contents in no particular order
    pub fn snapshot(&self) -> WalletResult<Vec<V>> {
        Ok(self.read_state()?.items.values().cloned().collect())
    }
}
