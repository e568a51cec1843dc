//! Category repository
//!
//! Categories are memoized and sorted by their manual order.

use crate::error::WalletResult;
use crate::mapper::category::{to_domain, to_record};
use crate::models::{Category, CategoryId};

use super::map_valid;
use super::memo::RepositoryMemo;
use super::records::CategoryRecord;
use super::table::Table;

/// Repository for category persistence
pub struct CategoryRepository {
    table: Box<dyn Table<CategoryRecord>>,
    memo: RepositoryMemo<Category>,
}

fn by_order(categories: &mut Vec<Category>) {
    categories.sort_by(|a, b| {
        a.order_num
            .total_cmp(&b.order_num)
            .then_with(|| a.name.cmp(&b.name))
    });
}

impl CategoryRepository {
    pub fn new(table: Box<dyn Table<CategoryRecord>>) -> Self {
        Self {
            table,
            memo: RepositoryMemo::new(),
        }
    }

    fn scan(&self) -> WalletResult<Vec<Category>> {
        Ok(map_valid(self.table.find_all()?, "category", to_domain))
    }

    /// All categories in manual order
    pub fn find_all(&self, include_deleted: bool) -> WalletResult<Vec<Category>> {
        let categories = self.memo.find_all(|| self.scan(), by_order)?;
        Ok(categories
            .into_iter()
            .filter(|c| include_deleted || !c.removed)
            .collect())
    }

    pub fn find_by_id(&self, id: CategoryId) -> WalletResult<Option<Category>> {
        self.memo.find_by_id(id, |id| {
            let record = self.table.find_by_id(*id.as_uuid())?;
            Ok(record.and_then(|r| map_valid(vec![r], "category", to_domain).pop()))
        })
    }

    /// Find an active category by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> WalletResult<Option<Category>> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .find_all(false)?
            .into_iter()
            .find(|c| c.name.as_str().to_lowercase() == name_lower))
    }

    /// Highest `order_num` in use, removed categories included.
    ///
    /// Answered from the memo once it holds every category; otherwise the
    /// backend rows are consulted directly.
    pub fn find_max_order_num(&self) -> WalletResult<Option<f64>> {
        let orders: Vec<f64> = if self.memo.find_all_memoized() {
            self.memo.snapshot()?.iter().map(|c| c.order_num).collect()
        } else {
            self.table.find_all()?.iter().map(|r| r.order_num).collect()
        };
        Ok(orders.into_iter().max_by(f64::total_cmp))
    }

    /// Insert or update a category
    pub fn save(&self, category: Category) -> WalletResult<()> {
        self.memo
            .save(category, |c| self.table.save(to_record(c)))
    }

    pub fn save_many(&self, categories: Vec<Category>) -> WalletResult<()> {
        self.memo.save_many(categories, |categories| {
            self.table
                .save_many(categories.iter().map(to_record).collect())
        })
    }

    /// Physically delete a category row. Services soft-delete instead.
    pub fn delete_by_id(&self, id: CategoryId) -> WalletResult<()> {
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
    use crate::storage::table::{JsonTable, MemoryTable};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn category(name: &str, order: f64) -> Category {
        Category::new(NotBlankTrimmedString::new(name).unwrap()).with_order_num(order)
    }

    #[test]
    fn test_max_order_num_without_and_with_memo() {
        let table = Arc::new(MemoryTable::with_records(vec![
            to_record(&category("Food", 1.0)),
            to_record(&category("Rent", 4.0).mark_removed()),
        ]));
        let repo = CategoryRepository::new(Box::new(table.clone()));

        assert_eq!(repo.find_max_order_num().unwrap(), Some(4.0));

        repo.find_all(true).unwrap();
        let reads = table.reads();
        repo.save(category("Fun", 9.0)).unwrap();
        assert_eq!(repo.find_max_order_num().unwrap(), Some(9.0));
        assert_eq!(table.reads(), reads);
    }

    #[test]
    fn test_empty_repository_has_no_max_order() {
        let repo = CategoryRepository::new(Box::new(MemoryTable::<CategoryRecord>::new()));
        assert_eq!(repo.find_max_order_num().unwrap(), None);
    }

    #[test]
    fn test_persisted_across_repositories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("categories.json");

        let food = category("Food", 0.0);
        CategoryRepository::new(Box::new(JsonTable::new(path.clone())))
            .save(food.clone())
            .unwrap();

        let reopened = CategoryRepository::new(Box::new(JsonTable::new(path)));
        assert_eq!(reopened.find_by_id(food.id).unwrap(), Some(food.clone()));
        assert_eq!(reopened.find_by_name("FOOD").unwrap(), Some(food));
    }

    #[test]
    fn test_soft_deleted_hidden_by_default() {
        let repo = CategoryRepository::new(Box::new(MemoryTable::<CategoryRecord>::new()));
        let food = category("Food", 0.0);
        repo.save(food.clone()).unwrap();
        repo.save(food.clone().mark_removed()).unwrap();

        assert!(repo.find_all(false).unwrap().is_empty());
        assert!(repo.find_by_id(food.id).unwrap().unwrap().removed);
    }
}
