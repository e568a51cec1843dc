//! Saved report filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AccountId, Money, NotBlankTrimmedString, TransactionType};
use crate::storage::records::Record;

use super::filter::{CategoryKey, PlannedPaymentType, TimePeriod};

/// Serializable form of a [`ReportFilter`](super::ReportFilter).
/// Accounts and categories are kept by id only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    #[serde(default)]
    pub types: Vec<TransactionType>,
    #[serde(default)]
    pub period: Option<TimePeriod>,
    #[serde(default)]
    pub accounts: Vec<AccountId>,
    #[serde(default)]
    pub categories: Vec<CategoryKey>,
    #[serde(default)]
    pub min_amount: Option<Money>,
    #[serde(default)]
    pub max_amount: Option<Money>,
    #[serde(default)]
    pub include_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default)]
    pub planned: Vec<PlannedPaymentType>,
    #[serde(default)]
    pub transfers_as_income_expense: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: Uuid,
    pub name: String,
    pub filter: FilterSnapshot,
    pub created_at: DateTime<Utc>,
}

impl ReportTemplate {
    pub fn new(name: NotBlankTrimmedString, filter: FilterSnapshot, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.as_str().to_string(),
            filter,
            created_at,
        }
    }
}

impl Record for ReportTemplate {
    fn id(&self) -> Uuid {
        self.id
    }
}
