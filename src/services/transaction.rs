//! Transaction service
//!
//! Use cases for recording income, expenses and transfers, settling planned
//! payments and soft-deleting transactions.

use chrono::{DateTime, Utc};

use crate::error::{WalletError, WalletResult};
use crate::models::{
    Account, AccountId, CategoryId, Flow, Money, NotBlankTrimmedString, PositiveAmount, TagId,
    Transaction, TransactionId, TransactionKind, TransactionTime, Transfer, Value,
};
use crate::storage::Storage;

/// Input for an income or expense
#[derive(Debug, Clone)]
pub struct FlowInput {
    pub account: AccountId,
    pub amount: Money,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
    pub time: TransactionTime,
    pub tags: Vec<TagId>,
}

impl FlowInput {
    pub fn new(account: AccountId, amount: Money, time: TransactionTime) -> Self {
        Self {
            account,
            amount,
            title: None,
            description: None,
            category: None,
            time,
            tags: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }
}

/// Input for a transfer. `to_amount` defaults to `amount`.
#[derive(Debug, Clone)]
pub struct TransferInput {
    pub from: AccountId,
    pub amount: Money,
    pub to: AccountId,
    pub to_amount: Option<Money>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub time: TransactionTime,
}

pub struct TransactionService<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn active_account(&self, id: AccountId) -> WalletResult<Account> {
        let account = self
            .storage
            .accounts
            .find_by_id(id)?
            .ok_or_else(|| WalletError::account_not_found(id.to_string()))?;
        if account.removed {
            return Err(WalletError::Validation(format!(
                "Account '{}' is archived",
                account.name
            )));
        }
        Ok(account)
    }

    fn check_category(&self, category: Option<CategoryId>) -> WalletResult<()> {
        if let Some(id) = category {
            if self.storage.categories.find_by_id(id)?.is_none() {
                return Err(WalletError::category_not_found(id.to_string()));
            }
        }
        Ok(())
    }

    fn add_flow(&self, input: FlowInput, income: bool) -> WalletResult<Transaction> {
        let account = self.active_account(input.account)?;
        self.check_category(input.category)?;

        let flow = Flow::new(account.id, Value::new(PositiveAmount::new(input.amount)?, account.asset));
        let kind = if income {
            TransactionKind::Income(flow)
        } else {
            TransactionKind::Expense(flow)
        };

        let transaction = Transaction::new(kind, input.time)
            .with_title(NotBlankTrimmedString::optional(input.title.as_deref()))
            .with_description(NotBlankTrimmedString::optional(input.description.as_deref()))
            .with_category(input.category)
            .with_tags(input.tags);
        self.storage.transactions.save(transaction.clone())?;

        tracing::info!(
            id = %transaction.id,
            kind = %transaction.transaction_type(),
            amount = %transaction.kind.primary_value(),
            settled = transaction.settled(),
            "transaction created"
        );
        Ok(transaction)
    }

    pub fn add_income(&self, input: FlowInput) -> WalletResult<Transaction> {
        self.add_flow(input, true)
    }

    pub fn add_expense(&self, input: FlowInput) -> WalletResult<Transaction> {
        self.add_flow(input, false)
    }

    pub fn add_transfer(&self, input: TransferInput) -> WalletResult<Transaction> {
        let from = self.active_account(input.from)?;
        let to = self.active_account(input.to)?;

        let from_value = Value::new(PositiveAmount::new(input.amount)?, from.asset);
        let to_value = Value::new(
            PositiveAmount::new(input.to_amount.unwrap_or(input.amount))?,
            to.asset,
        );
        let transfer = Transfer::new(from.id, from_value, to.id, to_value)?;

        let transaction = Transaction::new(TransactionKind::Transfer(transfer), input.time)
            .with_title(NotBlankTrimmedString::optional(input.title.as_deref()))
            .with_description(NotBlankTrimmedString::optional(input.description.as_deref()));
        self.storage.transactions.save(transaction.clone())?;

        tracing::info!(
            id = %transaction.id,
            from = %from.name,
            to = %to.name,
            "transfer created"
        );
        Ok(transaction)
    }

    pub fn get(&self, id: TransactionId) -> WalletResult<Option<Transaction>> {
        self.storage.transactions.find_by_id(id)
    }

    /// Find by full UUID or the short display form
    pub fn find(&self, identifier: &str) -> WalletResult<Option<Transaction>> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return self.get(id);
        }
        Ok(self
            .storage
            .transactions
            .find_all(true)?
            .into_iter()
            .find(|t| t.id.to_string() == identifier))
    }

    pub fn require(&self, identifier: &str) -> WalletResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| WalletError::transaction_not_found(identifier))
    }

    /// Active transactions, newest first
    pub fn list(&self) -> WalletResult<Vec<Transaction>> {
        self.storage.transactions.find_all(false)
    }

    pub fn list_for_account(&self, account: AccountId) -> WalletResult<Vec<Transaction>> {
        self.storage.transactions.find_by_account(account)
    }

    /// Turn a planned transaction into a settled one at `at`
    pub fn settle(&self, id: TransactionId, at: DateTime<Utc>) -> WalletResult<Transaction> {
        let transaction = self
            .get(id)?
            .ok_or_else(|| WalletError::transaction_not_found(id.to_string()))?;
        if transaction.settled() {
            return Err(WalletError::Validation(format!(
                "Transaction {} is already settled",
                id
            )));
        }

        let transaction = transaction.settle(at);
        self.storage.transactions.save(transaction.clone())?;

        tracing::info!(id = %transaction.id, at = %at, "transaction settled");
        Ok(transaction)
    }

    /// Soft delete
    pub fn remove(&self, id: TransactionId) -> WalletResult<Transaction> {
        let transaction = self
            .get(id)?
            .ok_or_else(|| WalletError::transaction_not_found(id.to_string()))?;
        if transaction.removed {
            return Err(WalletError::Validation(format!(
                "Transaction {} is already removed",
                id
            )));
        }

        let transaction = transaction.mark_removed();
        self.storage.transactions.save(transaction.clone())?;

        tracing::info!(id = %transaction.id, "transaction removed");
        Ok(transaction)
    }

    pub fn set_category(
        &self,
        id: TransactionId,
        category: Option<CategoryId>,
    ) -> WalletResult<Transaction> {
        let transaction = self
            .get(id)?
            .ok_or_else(|| WalletError::transaction_not_found(id.to_string()))?;
        self.check_category(category)?;

        let transaction = transaction.with_category(category);
        self.storage.transactions.save(transaction.clone())?;
        Ok(transaction)
    }
}
