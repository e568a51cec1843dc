//! Transaction model
//!
//! A transaction is either an income, an expense or a transfer between two
//! accounts. The shared fields live on [`Transaction`]; the kind-specific
//! ones live in [`TransactionKind`], which every consumer matches on
//! exhaustively.
//!
//! A transaction is either settled (it has an actual time) or planned (it
//! has a due time). [`TransactionTime`] makes the two mutually exclusive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ids::{AccountId, CategoryId, TagId, TransactionId};
use super::money::Money;
use super::primitives::{NotBlankTrimmedString, ValidationError, Value};

/// Discriminant of [`TransactionKind`], used by filters, records and exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [Self::Income, Self::Expense, Self::Transfer];

    /// Upper-case label used in CSV files
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }

    /// Parse from either the CSV label or the lowercase serde name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
            Self::Transfer => write!(f, "Transfer"),
        }
    }
}

/// The authoritative timestamp of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "lowercase")]
pub enum TransactionTime {
    /// Settled: the money actually moved at this time
    Actual(DateTime<Utc>),
    /// Planned: the payment is expected at this time
    Due(DateTime<Utc>),
}

impl TransactionTime {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Actual(at) | Self::Due(at) => *at,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Actual(_))
    }
}

/// Links to entities managed elsewhere (recurring rules, loans)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub recurring_rule_id: Option<Uuid>,
    pub loan_id: Option<Uuid>,
    pub loan_record_id: Option<Uuid>,
}

/// Money entering or leaving a single account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flow {
    pub account: AccountId,
    pub value: Value,
}

impl Flow {
    pub fn new(account: AccountId, value: Value) -> Self {
        Self { account, value }
    }
}

/// Money moving between two distinct accounts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TransferFields")]
pub struct Transfer {
    from_account: AccountId,
    from_value: Value,
    to_account: AccountId,
    to_value: Value,
}

impl Transfer {
    /// Fails when both sides name the same account
    pub fn new(
        from_account: AccountId,
        from_value: Value,
        to_account: AccountId,
        to_value: Value,
    ) -> Result<Self, ValidationError> {
        if from_account == to_account {
            return Err(ValidationError::SameTransferAccount);
        }
        Ok(Self {
            from_account,
            from_value,
            to_account,
            to_value,
        })
    }

    pub fn from_account(&self) -> AccountId {
        self.from_account
    }

    pub fn from_value(&self) -> &Value {
        &self.from_value
    }

    pub fn to_account(&self) -> AccountId {
        self.to_account
    }

    pub fn to_value(&self) -> &Value {
        &self.to_value
    }
}

#[derive(Deserialize)]
struct TransferFields {
    from_account: AccountId,
    from_value: Value,
    to_account: AccountId,
    to_value: Value,
}

impl TryFrom<TransferFields> for Transfer {
    type Error = ValidationError;

    fn try_from(fields: TransferFields) -> Result<Self, Self::Error> {
        Transfer::new(
            fields.from_account,
            fields.from_value,
            fields.to_account,
            fields.to_value,
        )
    }
}

/// Kind-specific transaction data
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Income(Flow),
    Expense(Flow),
    Transfer(Transfer),
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Income(_) => TransactionType::Income,
            Self::Expense(_) => TransactionType::Expense,
            Self::Transfer(_) => TransactionType::Transfer,
        }
    }

    /// The account money leaves (expense, transfer) or enters (income)
    pub fn primary_account(&self) -> AccountId {
        match self {
            Self::Income(flow) | Self::Expense(flow) => flow.account,
            Self::Transfer(transfer) => transfer.from_account,
        }
    }

    /// The value stored in the record's `amount` column
    pub fn primary_value(&self) -> &Value {
        match self {
            Self::Income(flow) | Self::Expense(flow) => &flow.value,
            Self::Transfer(transfer) => &transfer.from_value,
        }
    }

    /// Destination account, only for transfers
    pub fn to_account(&self) -> Option<AccountId> {
        match self {
            Self::Income(_) | Self::Expense(_) => None,
            Self::Transfer(transfer) => Some(transfer.to_account),
        }
    }

    /// Whether the transaction touches the given account on either side
    pub fn touches(&self, account: AccountId) -> bool {
        match self {
            Self::Income(flow) | Self::Expense(flow) => flow.account == account,
            Self::Transfer(transfer) => {
                transfer.from_account == account || transfer.to_account == account
            }
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub title: Option<NotBlankTrimmedString>,
    pub description: Option<NotBlankTrimmedString>,
    pub category: Option<CategoryId>,
    pub time: TransactionTime,
    pub metadata: TransactionMetadata,
    /// Soft-delete flag
    pub removed: bool,
    pub last_updated: DateTime<Utc>,
    pub tags: Vec<TagId>,
    pub kind: TransactionKind,
}

impl Transaction {
    /// Create a new transaction with no title, category or tags
    pub fn new(kind: TransactionKind, time: TransactionTime) -> Self {
        Self {
            id: TransactionId::new(),
            title: None,
            description: None,
            category: None,
            time,
            metadata: TransactionMetadata::default(),
            removed: false,
            last_updated: Utc::now(),
            tags: Vec::new(),
            kind,
        }
    }

    pub fn with_title(mut self, title: Option<NotBlankTrimmedString>) -> Self {
        self.title = title;
        self.last_updated = Utc::now();
        self
    }

    pub fn with_description(mut self, description: Option<NotBlankTrimmedString>) -> Self {
        self.description = description;
        self.last_updated = Utc::now();
        self
    }

    pub fn with_category(mut self, category: Option<CategoryId>) -> Self {
        self.category = category;
        self.last_updated = Utc::now();
        self
    }

    pub fn with_metadata(mut self, metadata: TransactionMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagId>) -> Self {
        self.tags = tags;
        self.last_updated = Utc::now();
        self
    }

    /// Turn a planned transaction into a settled one at `at`.
    /// Already settled transactions are returned unchanged.
    pub fn settle(mut self, at: DateTime<Utc>) -> Self {
        if let TransactionTime::Due(_) = self.time {
            self.time = TransactionTime::Actual(at);
            self.last_updated = Utc::now();
        }
        self
    }

    /// Returns a copy flagged as removed
    pub fn mark_removed(mut self) -> Self {
        self.removed = true;
        self.last_updated = Utc::now();
        self
    }

    pub fn settled(&self) -> bool {
        self.time.is_settled()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.time.timestamp()
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// Signed effect on a single-account view: positive for income,
    /// negative for expense, zero for transfers.
    pub fn signed_amount(&self) -> Money {
        match &self.kind {
            TransactionKind::Income(flow) => flow.value.money(),
            TransactionKind::Expense(flow) => -flow.value.money(),
            TransactionKind::Transfer(_) => Money::zero(),
        }
    }

    /// Case-insensitive keyword match against title and description
    pub fn mentions(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        [&self.title, &self.description]
            .into_iter()
            .flatten()
            .any(|text| text.as_str().to_lowercase().contains(&needle))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.title.as_ref().map(|t| t.as_str()).unwrap_or("(untitled)");
        write!(
            f,
            "{} {} {} {}",
            self.timestamp().format("%Y-%m-%d"),
            self.transaction_type(),
            title,
            self.kind.primary_value()
        )
    }
}
