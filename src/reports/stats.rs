//! Income and expense statistics for a set of transactions

use serde::Serialize;

use crate::models::{AccountId, AssetCode, Money, Transaction, TransactionKind, Value};
use crate::rates::ExchangeRates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExtendedStats {
    pub balance: Money,
    pub income: Money,
    pub expense: Money,
    pub incomes_count: usize,
    pub expenses_count: usize,
    pub transfers_count: usize,
}

pub struct StatsInput<'a> {
    pub transactions: &'a [Transaction],
    pub output_currency: &'a AssetCode,
    pub rates: &'a ExchangeRates,
    /// Accounts the report is scoped to; empty means all
    pub accounts: &'a [AccountId],
    pub transfers_as_income_expense: bool,
}

impl StatsInput<'_> {
    fn convert(&self, value: &Value) -> Option<Money> {
        let converted = self
            .rates
            .convert(value.money(), &value.asset, self.output_currency);
        if converted.is_none() {
            tracing::warn!(
                asset = %value.asset,
                output = %self.output_currency,
                "no exchange rate, value left out of stats"
            );
        }
        converted
    }

    fn selected(&self, account: AccountId) -> bool {
        self.accounts.is_empty() || self.accounts.contains(&account)
    }
}

/// Settled transactions only. Transfers count as income or expense only
/// when `transfers_as_income_expense` is set and they cross the account
/// selection.
pub fn calculate_stats(input: &StatsInput<'_>) -> ExtendedStats {
    let mut stats = ExtendedStats::default();

    for transaction in input.transactions.iter().filter(|t| t.settled() && !t.removed) {
        match &transaction.kind {
            TransactionKind::Income(flow) => {
                if let Some(amount) = input.convert(&flow.value) {
                    stats.income = stats.income + amount;
                    stats.incomes_count += 1;
                }
            }
            TransactionKind::Expense(flow) => {
                if let Some(amount) = input.convert(&flow.value) {
                    stats.expense = stats.expense + amount;
                    stats.expenses_count += 1;
                }
            }
            TransactionKind::Transfer(transfer) => {
                stats.transfers_count += 1;
                if !input.transfers_as_income_expense {
                    continue;
                }
                if input.selected(transfer.to_account()) {
                    if let Some(amount) = input.convert(transfer.to_value()) {
                        stats.income = stats.income + amount;
                        stats.incomes_count += 1;
                    }
                }
                if input.selected(transfer.from_account()) {
                    if let Some(amount) = input.convert(transfer.from_value()) {
                        stats.expense = stats.expense + amount;
                        stats.expenses_count += 1;
                    }
                }
            }
        }
    }

    stats.balance = stats.income - stats.expense;
    stats
}
