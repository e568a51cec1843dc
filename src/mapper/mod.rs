//! Translation between persisted records and domain entities
//!
//! Records are loose; entities are validated. Every `to_domain` function
//! here is pure and reports why a record cannot become an entity, so the
//! repositories can drop and log it without failing the whole query.

pub mod account;
pub mod category;
pub mod tag;
pub mod transaction;

use thiserror::Error;
use uuid::Uuid;

use crate::models::ValidationError;

/// Why a persisted record could not be mapped to a domain entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("record {record}: invalid {field}: {source}")]
    Invalid {
        record: Uuid,
        field: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("record {record}: no asset code known for account {account}")]
    UnknownAsset { record: Uuid, account: Uuid },

    #[error("transfer {0} has no destination account")]
    MissingDestinationAccount(Uuid),

    #[error("transfer {0} has no destination amount")]
    MissingTransferAmount(Uuid),

    #[error("transfer {0} has the same source and destination account")]
    SameAccounts(Uuid),

    #[error("transaction {0} has neither a date nor a due date")]
    MissingTime(Uuid),
}

impl MappingError {
    pub(crate) fn invalid(record: Uuid, field: &'static str) -> impl FnOnce(ValidationError) -> Self {
        move |source| Self::Invalid {
            record,
            field,
            source,
        }
    }
}
