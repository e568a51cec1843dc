//! Category model
//!
//! Categories are a flat list ordered manually through `order_num`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::primitives::NotBlankTrimmedString;

/// A transaction category (e.g., "Groceries", "Salary")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: NotBlankTrimmedString,

    /// ARGB color used by front ends
    pub color: i32,

    pub icon: Option<String>,

    /// Manual sort position; lower sorts first
    pub order_num: f64,

    /// Soft-delete flag
    pub removed: bool,

    pub last_updated: DateTime<Utc>,
}

impl Category {
    pub fn new(name: NotBlankTrimmedString) -> Self {
        Self {
            id: CategoryId::new(),
            name,
            color: 0,
            icon: None,
            order_num: 0.0,
            removed: false,
            last_updated: Utc::now(),
        }
    }

    pub fn with_order_num(mut self, order_num: f64) -> Self {
        self.order_num = order_num;
        self.last_updated = Utc::now();
        self
    }

    pub fn with_name(mut self, name: NotBlankTrimmedString) -> Self {
        self.name = name;
        self.last_updated = Utc::now();
        self
    }

    pub fn with_color(mut self, color: i32) -> Self {
        self.color = color;
        self
    }

    /// Returns a copy flagged as removed
    pub fn mark_removed(mut self) -> Self {
        self.removed = true;
        self.last_updated = Utc::now();
        self
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
