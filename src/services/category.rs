//! Category service
//!
//! Categories are kept in manual order; new ones go to the end. Removal is a
//! soft delete, so transactions keep pointing at a valid category.

use crate::error::{WalletError, WalletResult};
use crate::models::{Category, CategoryId, NotBlankTrimmedString};
use crate::storage::Storage;

pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn validated_name(&self, name: &str, current: Option<CategoryId>) -> WalletResult<NotBlankTrimmedString> {
        let name = NotBlankTrimmedString::new(name)
            .map_err(|_| WalletError::Validation("Category name cannot be empty".into()))?;
        if let Some(existing) = self.storage.categories.find_by_name(name.as_str())? {
            if Some(existing.id) != current {
                return Err(WalletError::Duplicate {
                    entity_type: "Category",
                    identifier: name.as_str().to_string(),
                });
            }
        }
        Ok(name)
    }

    /// Create a category at the end of the manual order
    pub fn create(&self, name: &str, color: Option<i32>) -> WalletResult<Category> {
        let name = self.validated_name(name, None)?;
        let order_num = self
            .storage
            .categories
            .find_max_order_num()?
            .map_or(0.0, |max| max + 1.0);

        let mut category = Category::new(name).with_order_num(order_num);
        if let Some(color) = color {
            category = category.with_color(color);
        }
        self.storage.categories.save(category.clone())?;

        tracing::info!(category = %category.name, "category created");
        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> WalletResult<Option<Category>> {
        self.storage.categories.find_by_id(id)
    }

    /// Find a category by name or ID string
    pub fn find(&self, identifier: &str) -> WalletResult<Option<Category>> {
        if let Some(category) = self.storage.categories.find_by_name(identifier)? {
            return Ok(Some(category));
        }
        if let Ok(id) = identifier.trim().parse::<CategoryId>() {
            return self.get(id);
        }
        Ok(self
            .storage
            .categories
            .find_all(true)?
            .into_iter()
            .find(|c| c.id.to_string() == identifier.trim()))
    }

    pub fn require(&self, identifier: &str) -> WalletResult<Category> {
        self.find(identifier)?
            .ok_or_else(|| WalletError::category_not_found(identifier))
    }

    pub fn list(&self) -> WalletResult<Vec<Category>> {
        self.storage.categories.find_all(false)
    }

    pub fn rename(&self, id: CategoryId, new_name: &str) -> WalletResult<Category> {
        let category = self
            .get(id)?
            .ok_or_else(|| WalletError::category_not_found(id.to_string()))?;
        let name = self.validated_name(new_name, Some(id))?;

        let category = category.with_name(name);
        self.storage.categories.save(category.clone())?;
        Ok(category)
    }

    /// Move a category to `position` (0-based) in the manual order.
    /// Every category gets a fresh, evenly spaced order number.
    pub fn reorder(&self, id: CategoryId, position: usize) -> WalletResult<Vec<Category>> {
        let mut categories = self.list()?;
        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| WalletError::category_not_found(id.to_string()))?;

        let moved = categories.remove(index);
        let position = position.min(categories.len());
        categories.insert(position, moved);

        let reordered: Vec<Category> = categories
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_order_num(i as f64))
            .collect();
        self.storage.categories.save_many(reordered.clone())?;
        Ok(reordered)
    }

    /// Soft delete
    pub fn remove(&self, id: CategoryId) -> WalletResult<Category> {
        let category = self
            .get(id)?
            .ok_or_else(|| WalletError::category_not_found(id.to_string()))?;
        if category.removed {
            return Err(WalletError::Validation("Category is already removed".into()));
        }

        let category = category.mark_removed();
        self.storage.categories.save(category.clone())?;

        tracing::info!(category = %category.name, "category removed");
        Ok(category)
    }
}
