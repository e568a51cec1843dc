//! Persisted row shapes
//!
//! Records mirror what is on disk and are deliberately loose: names may be
//! blank, amounts may be non-positive, a transfer may lack its destination.
//! The mapper decides whether a record can become a domain entity.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Money, TransactionType};

/// A row that can live in a [`Table`](super::Table)
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: Uuid,
    pub name: String,
    /// Missing currency falls back to the base currency
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub color: i32,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub include_in_balance: bool,
    #[serde(default)]
    pub order_num: f64,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub color: i32,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order_num: f64,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub color: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Links a tag to any entity through the entity's association id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAssociationRecord {
    pub id: Uuid,
    pub tag_id: Uuid,
    pub associated_id: Uuid,
    pub last_synced: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Money,
    #[serde(default)]
    pub to_account_id: Option<Uuid>,
    #[serde(default)]
    pub to_amount: Option<Money>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Set when the transaction is settled
    #[serde(default)]
    pub date_time: Option<DateTime<Utc>>,
    /// Set when the transaction is planned
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recurring_rule_id: Option<Uuid>,
    #[serde(default)]
    pub loan_id: Option<Uuid>,
    #[serde(default)]
    pub loan_record_id: Option<Uuid>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// One conversion rate: 1 unit of `base` buys `rate` units of `currency`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateRecord {
    pub id: Uuid,
    pub base: String,
    pub currency: String,
    pub rate: f64,
    #[serde(default)]
    pub manual_override: bool,
}

fn default_true() -> bool {
    true
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                fn id(&self) -> Uuid {
                    self.id
                }
            }
        )*
    };
}

impl_record!(
    AccountRecord,
    CategoryRecord,
    TagRecord,
    TagAssociationRecord,
    TransactionRecord,
    ExchangeRateRecord,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_record_defaults() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"id":"{}","name":"Cash"}}"#, id);
        let record: AccountRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record.id(), id);
        assert!(record.currency.is_none());
        assert!(record.include_in_balance);
        assert!(!record.is_deleted);
    }

    #[test]
    fn test_transaction_record_type_field() {
        let json = format!(
            r#"{{"id":"{}","account_id":"{}","type":"expense","amount":550}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let record: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.kind, TransactionType::Expense);
        assert_eq!(record.amount.cents(), 550);
        assert!(record.date_time.is_none());
    }
}
