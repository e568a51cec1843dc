//! Tag repository and tag associations
//!
//! Tags are memoized and listed newest first. Associations link a tag to
//! any entity's [`AssociationId`]; they are not memoized. Deleting a tag is
//! physical and takes its associations with it.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::WalletResult;
use crate::mapper::tag::{association_record, to_domain, to_record};
use crate::models::{AssociationId, Tag, TagId};

use super::map_valid;
use super::memo::RepositoryMemo;
use super::records::{TagAssociationRecord, TagRecord};
use super::table::Table;

/// Repository for tags and their associations
pub struct TagRepository {
    tags: Box<dyn Table<TagRecord>>,
    associations: Box<dyn Table<TagAssociationRecord>>,
    memo: RepositoryMemo<Tag>,
}

fn newest_first(tags: &mut Vec<Tag>) {
    tags.sort_by(|a, b| {
        b.creation_timestamp
            .cmp(&a.creation_timestamp)
            .then_with(|| a.name.cmp(&b.name))
    });
}

impl TagRepository {
    pub fn new(
        tags: Box<dyn Table<TagRecord>>,
        associations: Box<dyn Table<TagAssociationRecord>>,
    ) -> Self {
        Self {
            tags,
            associations,
            memo: RepositoryMemo::new(),
        }
    }

    fn scan(&self) -> WalletResult<Vec<Tag>> {
        Ok(map_valid(self.tags.find_all()?, "tag", to_domain))
    }

    /// All tags, newest first
    pub fn find_all(&self, include_deleted: bool) -> WalletResult<Vec<Tag>> {
        let tags = self.memo.find_all(|| self.scan(), newest_first)?;
        Ok(tags
            .into_iter()
            .filter(|t| include_deleted || !t.removed)
            .collect())
    }

    pub fn find_by_id(&self, id: TagId) -> WalletResult<Option<Tag>> {
        self.memo.find_by_id(id, |id| {
            let record = self.tags.find_by_id(*id.as_uuid())?;
            Ok(record.and_then(|r| map_valid(vec![r], "tag", to_domain).pop()))
        })
    }

    /// Find a tag by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> WalletResult<Option<Tag>> {
        let name_lower = name.trim().trim_start_matches('#').to_lowercase();
        Ok(self
            .find_all(false)?
            .into_iter()
            .find(|t| t.name.as_str().to_lowercase() == name_lower))
    }

    pub fn save(&self, tag: Tag) -> WalletResult<()> {
        self.memo.save(tag, |t| self.tags.save(to_record(t)))
    }

    pub fn save_many(&self, tags: Vec<Tag>) -> WalletResult<()> {
        self.memo.save_many(tags, |tags| {
            self.tags.save_many(tags.iter().map(to_record).collect())
        })
    }

    /// Delete a tag and every association that uses it
    pub fn delete_by_id(&self, id: TagId) -> WalletResult<()> {
        self.memo.delete_by_id(id, |id| {
            let tag_uuid = *id.as_uuid();
            for link in self.associations.find_all()? {
                if link.tag_id == tag_uuid {
                    self.associations.delete_by_id(link.id)?;
                }
            }
            self.tags.delete_by_id(tag_uuid)
        })
    }

    pub fn delete_all(&self) -> WalletResult<()> {
        self.memo.delete_all(|| {
            self.associations.delete_all()?;
            self.tags.delete_all()
        })
    }

    /// Tag ids linked to `associated`, oldest link first
    pub fn find_by_association(&self, associated: AssociationId) -> WalletResult<Vec<TagId>> {
        let target = *associated.as_uuid();
        let mut links: Vec<_> = self
            .associations
            .find_all()?
            .into_iter()
            .filter(|l| l.associated_id == target)
            .collect();
        links.sort_by_key(|l| l.last_synced);
        Ok(links.into_iter().map(|l| TagId::from_uuid(l.tag_id)).collect())
    }

    /// Every association grouped by the associated entity
    pub fn association_index(&self) -> WalletResult<HashMap<Uuid, Vec<TagId>>> {
        let mut links = self.associations.find_all()?;
        links.sort_by_key(|l| l.last_synced);

        let mut index: HashMap<Uuid, Vec<TagId>> = HashMap::new();
        for link in links {
            index
                .entry(link.associated_id)
                .or_default()
                .push(TagId::from_uuid(link.tag_id));
        }
        Ok(index)
    }

    /// Link a tag to an entity; linking twice is a no-op
    pub fn associate(&self, tag: TagId, associated: AssociationId) -> WalletResult<()> {
        let already = self
            .associations
            .find_all()?
            .iter()
            .any(|l| l.tag_id == *tag.as_uuid() && l.associated_id == *associated.as_uuid());
        if already {
            return Ok(());
        }
        self.associations
            .save(association_record(tag, associated, Utc::now()))
    }

    pub fn remove_association(&self, tag: TagId, associated: AssociationId) -> WalletResult<()> {
        for link in self.associations.find_all()? {
            if link.tag_id == *tag.as_uuid() && link.associated_id == *associated.as_uuid() {
                self.associations.delete_by_id(link.id)?;
            }
        }
        Ok(())
    }

    /// Make the links of `associated` exactly `tags`
    pub fn set_associations(&self, associated: AssociationId, tags: &[TagId]) -> WalletResult<()> {
        let target = *associated.as_uuid();
        let existing: Vec<_> = self
            .associations
            .find_all()?
            .into_iter()
            .filter(|l| l.associated_id == target)
            .collect();

        for link in &existing {
            if !tags.iter().any(|t| *t.as_uuid() == link.tag_id) {
                self.associations.delete_by_id(link.id)?;
            }
        }

        let now = Utc::now();
        let added: Vec<_> = tags
            .iter()
            .filter(|t| !existing.iter().any(|l| l.tag_id == *t.as_uuid()))
            .map(|t| association_record(*t, associated, now))
            .collect();
        self.associations.save_many(added)
    }
}
