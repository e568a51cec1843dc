//! Grouping of report transactions into due sections and a dated history

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{AssetCode, Money, Transaction, TransactionKind};
use crate::rates::ExchangeRates;

use super::filter::PlannedPaymentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IncomeExpensePair {
    pub income: Money,
    pub expense: Money,
}

impl IncomeExpensePair {
    fn add(&mut self, transaction: &Transaction, output: &AssetCode, rates: &ExchangeRates) {
        let (flow, is_income) = match &transaction.kind {
            TransactionKind::Income(flow) => (flow, true),
            TransactionKind::Expense(flow) => (flow, false),
            TransactionKind::Transfer(_) => return,
        };
        let Some(amount) = rates.convert(flow.value.money(), &flow.value.asset, output) else {
            tracing::warn!(asset = %flow.value.asset, %output, "no exchange rate, value left out of totals");
            return;
        };
        if is_income {
            self.income += amount;
        } else {
            self.expense += amount;
        }
    }
}

/// Planned transactions of one kind, earliest due first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DueSection {
    pub transactions: Vec<Transaction>,
    pub totals: IncomeExpensePair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateDivider {
    pub date: NaiveDate,
    pub income: Money,
    pub expense: Money,
}

impl DateDivider {
    pub fn cash_flow(&self) -> Money {
        self.income - self.expense
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryItem {
    Divider(DateDivider),
    Transaction(Transaction),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionsList {
    pub upcoming: DueSection,
    pub overdue: DueSection,
    pub history: Vec<HistoryItem>,
}

impl TransactionsList {
    pub fn is_empty(&self) -> bool {
        self.upcoming.transactions.is_empty()
            && self.overdue.transactions.is_empty()
            && self.history.is_empty()
    }
}

/// Split into upcoming, overdue and a newest-first history with one
/// divider per UTC day. Amounts are converted into `output`.
pub fn group_transactions(
    transactions: &[Transaction],
    output: &AssetCode,
    rates: &ExchangeRates,
    now: DateTime<Utc>,
) -> TransactionsList {
    let mut list = TransactionsList::default();
    let mut settled = Vec::new();

    for transaction in transactions.iter().filter(|t| !t.removed) {
        let section = match PlannedPaymentType::of(transaction, now) {
            None => {
                settled.push(transaction.clone());
                continue;
            }
            Some(PlannedPaymentType::Upcoming) => &mut list.upcoming,
            Some(PlannedPaymentType::Overdue) => &mut list.overdue,
        };
        section.totals.add(transaction, output, rates);
        section.transactions.push(transaction.clone());
    }

    for section in [&mut list.upcoming, &mut list.overdue] {
        section.transactions.sort_by_key(|t| t.timestamp());
    }

    settled.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()).then_with(|| a.id.cmp(&b.id)));

    let mut current: Option<(usize, IncomeExpensePair, NaiveDate)> = None;
    for transaction in settled {
        let date = transaction.timestamp().date_naive();
        if current.map_or(true, |(_, _, d)| d != date) {
            close_day(&mut list.history, current.take());
            list.history.push(HistoryItem::Divider(DateDivider {
                date,
                income: Money::zero(),
                expense: Money::zero(),
            }));
            current = Some((list.history.len() - 1, IncomeExpensePair::default(), date));
        }
        if let Some((_, totals, _)) = current.as_mut() {
            totals.add(&transaction, output, rates);
        }
        list.history.push(HistoryItem::Transaction(transaction));
    }
    close_day(&mut list.history, current);

    list
}

fn close_day(history: &mut [HistoryItem], day: Option<(usize, IncomeExpensePair, NaiveDate)>) {
    if let Some((index, totals, _)) = day {
        if let Some(HistoryItem::Divider(divider)) = history.get_mut(index) {
            divider.income = totals.income;
            divider.expense = totals.expense;
        }
    }
}
