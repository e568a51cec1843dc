//! Core domain model for walletbook
//!
//! Immutable value types for accounts, categories, tags and transactions,
//! plus the validated primitives they are built from. Entities change only
//! by producing updated copies.

pub mod account;
pub mod category;
pub mod ids;
pub mod money;
pub mod primitives;
pub mod tag;
pub mod transaction;

pub use account::Account;
pub use category::Category;
pub use ids::{AccountId, AssociationId, CategoryId, TagId, TransactionId};
pub use money::{Money, MoneyParseError};
pub use primitives::{AssetCode, NotBlankTrimmedString, PositiveAmount, ValidationError, Value};
pub use tag::Tag;
pub use transaction::{
    Flow, Transaction, TransactionKind, TransactionMetadata, TransactionTime, TransactionType,
    Transfer,
};
