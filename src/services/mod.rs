//! Service layer for walletbook
//!
//! The service layer provides the use cases on top of the storage layer,
//! handling validation, lookups by name or id, and cross-entity operations.

pub mod account;
pub mod category;
pub mod tag;
pub mod transaction;

pub use account::{AccountService, AccountSummary};
pub use category::CategoryService;
pub use tag::TagService;
pub use transaction::{FlowInput, TransactionService, TransferInput};
