use uuid::Uuid;

use crate::models::{
    AccountId, AssetCode, CategoryId, Flow, NotBlankTrimmedString, PositiveAmount, TagId,
    Transaction, TransactionId, TransactionKind, TransactionMetadata, TransactionTime,
    TransactionType, Transfer, Value,
};
use crate::storage::records::TransactionRecord;

use super::MappingError;

/// Map a record into a transaction.
///
/// `asset_of` resolves an account's asset code; `tags` are the ids already
/// associated with the transaction.
pub fn to_domain<F>(
    record: &TransactionRecord,
    tags: Vec<TagId>,
    asset_of: F,
) -> Result<Transaction, MappingError>
where
    F: Fn(AccountId) -> Option<AssetCode>,
{
    let id = record.id;
    let time = match (record.date_time, record.due_date) {
        (Some(at), _) => TransactionTime::Actual(at),
        (None, Some(due)) => TransactionTime::Due(due),
        (None, None) => return Err(MappingError::MissingTime(id)),
    };

    let source = AccountId::from_uuid(record.account_id);
    let source_asset = asset_of(source).ok_or(MappingError::UnknownAsset {
        record: id,
        account: record.account_id,
    })?;
    let source_value = Value::new(
        PositiveAmount::new(record.amount).map_err(MappingError::invalid(id, "amount"))?,
        source_asset,
    );

    let kind = match record.kind {
        TransactionType::Income => TransactionKind::Income(Flow::new(source, source_value)),
        TransactionType::Expense => TransactionKind::Expense(Flow::new(source, source_value)),
        TransactionType::Transfer => {
            let to_uuid = record
                .to_account_id
                .ok_or(MappingError::MissingDestinationAccount(id))?;
            let to_amount = record
                .to_amount
                .ok_or(MappingError::MissingTransferAmount(id))?;
            let destination = AccountId::from_uuid(to_uuid);
            if destination == source {
                return Err(MappingError::SameAccounts(id));
            }
            let to_asset = asset_of(destination).ok_or(MappingError::UnknownAsset {
                record: id,
                account: to_uuid,
            })?;
            let to_value = Value::new(
                PositiveAmount::new(to_amount).map_err(MappingError::invalid(id, "to_amount"))?,
                to_asset,
            );
            let transfer = Transfer::new(source, source_value, destination, to_value)
                .map_err(|_| MappingError::SameAccounts(id))?;
            TransactionKind::Transfer(transfer)
        }
    };

    Ok(Transaction {
        id: TransactionId::from_uuid(id),
        title: NotBlankTrimmedString::optional(record.title.as_deref()),
        description: NotBlankTrimmedString::optional(record.description.as_deref()),
        category: record.category_id.map(CategoryId::from_uuid),
        time,
        metadata: TransactionMetadata {
            recurring_rule_id: record.recurring_rule_id,
            loan_id: record.loan_id,
            loan_record_id: record.loan_record_id,
        },
        removed: record.is_deleted,
        last_updated: record.last_updated.unwrap_or_default(),
        tags,
        kind,
    })
}

/// Tags are not part of the record; they persist as associations.
pub fn to_record(transaction: &Transaction) -> TransactionRecord {
    let (date_time, due_date) = match transaction.time {
        TransactionTime::Actual(at) => (Some(at), None),
        TransactionTime::Due(due) => (None, Some(due)),
    };

    let (to_account_id, to_amount) = match &transaction.kind {
        TransactionKind::Income(_) | TransactionKind::Expense(_) => (None, None),
        TransactionKind::Transfer(transfer) => (
            Some(*transfer.to_account().as_uuid()),
            Some(transfer.to_value().money()),
        ),
    };

    TransactionRecord {
        id: *transaction.id.as_uuid(),
        account_id: *transaction.kind.primary_account().as_uuid(),
        kind: transaction.transaction_type(),
        amount: transaction.kind.primary_value().money(),
        to_account_id,
        to_amount,
        title: transaction.title.as_ref().map(|t| t.as_str().to_string()),
        description: transaction.description.as_ref().map(|d| d.as_str().to_string()),
        category_id: transaction.category.map(Uuid::from),
        date_time,
        due_date,
        recurring_rule_id: transaction.metadata.recurring_rule_id,
        loan_id: transaction.metadata.loan_id,
        loan_record_id: transaction.metadata.loan_record_id,
        is_deleted: transaction.removed,
        last_updated: Some(transaction.last_updated),
    }
}
