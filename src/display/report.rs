//! Report formatting utilities for terminal output

use crate::models::{AssetCode, Money};
use crate::reports::{HistoryItem, ReportTemplate, ReportUiState};
use crate::storage::records::ExchangeRateRecord;

use super::transaction::{format_transaction_row, Names};

/// Format a money amount with color hints for terminal display
pub fn format_money_colored(amount: Money) -> String {
    if amount.is_negative() {
        format!("\x1b[31m{}\x1b[0m", amount) // Red for negative
    } else if amount.is_positive() {
        format!("\x1b[32m{}\x1b[0m", amount) // Green for positive
    } else {
        amount.to_string()
    }
}

/// Format a header line with padding
pub fn format_header(title: &str, width: usize) -> String {
    let padding = width.saturating_sub(title.len()) / 2;
    format!("{}{}", " ".repeat(padding), title)
}

fn section(output: &mut String, title: &str) {
    output.push('\n');
    output.push_str(title);
    output.push('\n');
    output.push_str(&"-".repeat(title.len()));
    output.push('\n');
}

/// Render a report: header totals, planned sections and the dated history
pub fn format_report(state: &ReportUiState, names: &Names<'_>, colored: bool) -> String {
    let money = |m: Money| if colored { format_money_colored(m) } else { m.to_string() };
    let currency = state
        .base_currency
        .as_ref()
        .map(AssetCode::as_str)
        .unwrap_or("");

    let mut output = String::new();
    output.push_str(&format_header("REPORT", 60));
    output.push('\n');

    let header = &state.header;
    output.push_str(&format!(
        "Balance: {} {}\nIncome:  {} {} ({})\nExpense: {} {} ({})\n",
        money(header.balance),
        currency,
        header.income,
        currency,
        header.incomes_count,
        header.expense,
        currency,
        header.expenses_count,
    ));
    if header.transfers_count > 0 {
        let note = if header.transfers_as_income_expense {
            " (counted as income/expense)"
        } else {
            ""
        };
        output.push_str(&format!("Transfers: {}{}\n", header.transfers_count, note));
    }

    if state.transactions.is_empty() {
        output.push_str("\nNo transactions match the filter.\n");
        return output;
    }

    for (title, due) in [("Upcoming", &state.list.upcoming), ("Overdue", &state.list.overdue)] {
        if due.transactions.is_empty() {
            continue;
        }
        section(
            &mut output,
            &format!(
                "{} (+{} / -{})",
                title, due.totals.income, due.totals.expense
            ),
        );
        for transaction in &due.transactions {
            output.push_str(&format_transaction_row(transaction, names));
            output.push('\n');
        }
    }

    if !state.list.history.is_empty() {
        section(&mut output, "History");
    }
    for item in &state.list.history {
        match item {
            HistoryItem::Divider(divider) => {
                output.push_str(&format!(
                    "\n{}  cash flow {}\n",
                    divider.date.format("%A, %Y-%m-%d"),
                    money(divider.cash_flow())
                ));
            }
            HistoryItem::Transaction(transaction) => {
                output.push_str(&format_transaction_row(transaction, names));
                output.push('\n');
            }
        }
    }

    output
}

pub fn format_template_list(templates: &[ReportTemplate]) -> String {
    if templates.is_empty() {
        return "No report templates saved.".to_string();
    }
    templates
        .iter()
        .map(|t| format!("{:<24} created {}\n", t.name, t.created_at.format("%Y-%m-%d")))
        .collect()
}

pub fn format_rate_list(rates: &[ExchangeRateRecord]) -> String {
    if rates.is_empty() {
        return "No exchange rates set.".to_string();
    }
    rates
        .iter()
        .map(|r| {
            format!(
                "1 {} = {} {}{}\n",
                r.base,
                r.rate,
                r.currency,
                if r.manual_override { "  (manual)" } else { "" }
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Account, Flow, NotBlankTrimmedString, PositiveAmount, Transaction, TransactionKind,
        TransactionTime, Value,
    };
    use crate::rates::ExchangeRates;
    use crate::reports::ReportViewModel;
    use chrono::{Duration, Utc};

    #[test]
    fn test_format_money_colored() {
        assert!(format_money_colored(Money::from_cents(-100)).contains("\x1b[31m"));
        assert!(format_money_colored(Money::from_cents(100)).contains("\x1b[32m"));
        assert_eq!(format_money_colored(Money::zero()), "0.00");
    }

    #[test]
    fn test_format_report() {
        let usd = AssetCode::new("USD").unwrap();
        let cash = Account::new(NotBlankTrimmedString::new("Cash").unwrap(), usd.clone());
        let expense = Transaction::new(
            TransactionKind::Expense(Flow::new(
                cash.id,
                Value::new(PositiveAmount::from_cents(4200).unwrap(), usd.clone()),
            )),
            TransactionTime::Actual(Utc::now() - Duration::hours(1)),
        );

        let mut vm = ReportViewModel::new(Utc::now());
        vm.set_base_currency(usd.clone());
        vm.set_rates(ExchangeRates::new(usd));
        vm.set_accounts(vec![cash.clone()]);
        vm.set_transactions(vec![expense]);

        let accounts = vec![cash];
        let output = format_report(vm.state(), &Names::new(&accounts, &[]), false);
        assert!(output.contains("Expense: 42.00 USD (1)"));
        assert!(output.contains("History"));
        assert!(output.contains("cash flow -42.00"));
    }

    #[test]
    fn test_format_rate_list() {
        let rates = vec![ExchangeRateRecord {
            id: uuid::Uuid::new_v4(),
            base: "USD".into(),
            currency: "EUR".into(),
            rate: 0.92,
            manual_override: true,
        }];
        assert_eq!(format_rate_list(&rates), "1 USD = 0.92 EUR  (manual)\n");
    }
}
