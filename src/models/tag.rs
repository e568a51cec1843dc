//! Tag model
//!
//! Tags are free-form labels attached many-to-many to other entities through
//! an [`AssociationId`](super::AssociationId). Unlike categories and
//! accounts, tags are deleted physically together with their associations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TagId;
use super::primitives::NotBlankTrimmedString;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: NotBlankTrimmedString,
    pub color: i32,
    pub creation_timestamp: DateTime<Utc>,
    pub removed: bool,
    pub last_updated: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: NotBlankTrimmedString) -> Self {
        let now = Utc::now();
        Self {
            id: TagId::new(),
            name,
            color: 0,
            creation_timestamp: now,
            removed: false,
            last_updated: now,
        }
    }

    pub fn with_name(mut self, name: NotBlankTrimmedString) -> Self {
        self.name = name;
        self.last_updated = Utc::now();
        self
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name)
    }
}
