//! Tag service
//!
//! Tags are deleted physically. Deleting one also removes its associations
//! and drops it from cached transactions.

use crate::error::{WalletError, WalletResult};
use crate::models::{NotBlankTrimmedString, Tag, TagId, TransactionId};
use crate::storage::Storage;

pub struct TagService<'a> {
    storage: &'a Storage,
}

impl<'a> TagService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, name: &str) -> WalletResult<Tag> {
        let name = NotBlankTrimmedString::new(name.trim().trim_start_matches('#'))
            .map_err(|_| WalletError::Validation("Tag name cannot be empty".into()))?;
        if self.storage.tags.find_by_name(name.as_str())?.is_some() {
            return Err(WalletError::Duplicate {
                entity_type: "Tag",
                identifier: name.as_str().to_string(),
            });
        }

        let tag = Tag::new(name);
        self.storage.tags.save(tag.clone())?;
        tracing::info!(tag = %tag.name, "tag created");
        Ok(tag)
    }

    pub fn list(&self) -> WalletResult<Vec<Tag>> {
        self.storage.tags.find_all(false)
    }

    /// Find by name (with or without `#`) or ID string
    pub fn find(&self, identifier: &str) -> WalletResult<Option<Tag>> {
        if let Some(tag) = self.storage.tags.find_by_name(identifier)? {
            return Ok(Some(tag));
        }
        if let Ok(id) = identifier.trim().parse::<TagId>() {
            return self.storage.tags.find_by_id(id);
        }
        Ok(None)
    }

    pub fn require(&self, identifier: &str) -> WalletResult<Tag> {
        self.find(identifier)?
            .ok_or_else(|| WalletError::tag_not_found(identifier))
    }

    pub fn delete(&self, id: TagId) -> WalletResult<()> {
        let tag = self
            .storage
            .tags
            .find_by_id(id)?
            .ok_or_else(|| WalletError::tag_not_found(id.to_string()))?;

        self.storage.tags.delete_by_id(id)?;
        self.storage.transactions.forget_tag(id)?;

        tracing::info!(tag = %tag.name, "tag deleted");
        Ok(())
    }

    /// Tag a transaction; tagging twice is a no-op
    pub fn attach(&self, tag: TagId, transaction: TransactionId) -> WalletResult<()> {
        let mut target = self
            .storage
            .transactions
            .find_by_id(transaction)?
            .ok_or_else(|| WalletError::transaction_not_found(transaction.to_string()))?;
        if self.storage.tags.find_by_id(tag)?.is_none() {
            return Err(WalletError::tag_not_found(tag.to_string()));
        }
        if target.tags.contains(&tag) {
            return Ok(());
        }

        target.tags.push(tag);
        self.storage.transactions.save(target)
    }

    pub fn detach(&self, tag: TagId, transaction: TransactionId) -> WalletResult<()> {
        let mut target = self
            .storage
            .transactions
            .find_by_id(transaction)?
            .ok_or_else(|| WalletError::transaction_not_found(transaction.to_string()))?;

        target.tags.retain(|t| *t != tag);
        self.storage.transactions.save(target)
    }
}
