//! Transaction display formatting
//!
//! Register-style rows. Planned transactions are marked with `○`,
//! transfers with `⇄`.

use std::collections::HashMap;

use crate::models::{Account, AccountId, Category, Transaction, TransactionKind};

/// Name lookups shared by the formatters
pub struct Names<'a> {
    accounts: HashMap<AccountId, &'a str>,
    categories: HashMap<crate::models::CategoryId, &'a str>,
}

impl<'a> Names<'a> {
    pub fn new(accounts: &'a [Account], categories: &'a [Category]) -> Self {
        Self {
            accounts: accounts.iter().map(|a| (a.id, a.name.as_str())).collect(),
            categories: categories.iter().map(|c| (c.id, c.name.as_str())).collect(),
        }
    }

    fn account(&self, id: AccountId) -> &str {
        self.accounts.get(&id).copied().unwrap_or("?")
    }

    fn category(&self, transaction: &Transaction) -> &str {
        transaction
            .category
            .and_then(|id| self.categories.get(&id).copied())
            .unwrap_or("")
    }
}

fn title(transaction: &Transaction) -> &str {
    transaction
        .title
        .as_ref()
        .map(|t| t.as_str())
        .unwrap_or("(untitled)")
}

fn account_column(transaction: &Transaction, names: &Names<'_>) -> String {
    match &transaction.kind {
        TransactionKind::Income(flow) | TransactionKind::Expense(flow) => {
            names.account(flow.account).to_string()
        }
        TransactionKind::Transfer(t) => format!(
            "{} ⇄ {}",
            names.account(t.from_account()),
            names.account(t.to_account())
        ),
    }
}

/// Format a single transaction for display (register row)
pub fn format_transaction_row(transaction: &Transaction, names: &Names<'_>) -> String {
    let marker = if transaction.settled() { " " } else { "○" };
    let amount = match &transaction.kind {
        TransactionKind::Transfer(t) => t.from_value().to_string(),
        _ => format!(
            "{} {}",
            transaction.signed_amount(),
            transaction.kind.primary_value().asset
        ),
    };

    format!(
        "{} {} {:12} {:20} {:20} {:14} {:>16}",
        marker,
        transaction.timestamp().format("%Y-%m-%d"),
        transaction.id.to_string(),
        truncate(title(transaction), 20),
        truncate(&account_column(transaction, names), 20),
        truncate(names.category(transaction), 14),
        amount
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(transactions: &[Transaction], names: &Names<'_>) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:1} {:10} {:12} {:20} {:20} {:14} {:>16}\n",
        "", "Date", "ID", "Title", "Account", "Category", "Amount"
    ));
    output.push_str(&"-".repeat(100));
    output.push('\n');

    for transaction in transactions {
        output.push_str(&format_transaction_row(transaction, names));
        output.push('\n');
    }
    output
}

/// Format full transaction details
pub fn format_transaction_details(transaction: &Transaction, names: &Names<'_>) -> String {
    let mut output = String::new();
    output.push_str(&format!("Transaction: {}\n", transaction.id.as_uuid()));
    output.push_str(&format!("  Type:        {}\n", transaction.transaction_type()));
    output.push_str(&format!("  Title:       {}\n", title(transaction)));

    let when = transaction.timestamp().format("%Y-%m-%d %H:%M UTC");
    if transaction.settled() {
        output.push_str(&format!("  Date:        {}\n", when));
    } else {
        output.push_str(&format!("  Due:         {} (planned)\n", when));
    }

    match &transaction.kind {
        TransactionKind::Income(flow) | TransactionKind::Expense(flow) => {
            output.push_str(&format!("  Account:     {}\n", names.account(flow.account)));
            output.push_str(&format!("  Amount:      {}\n", flow.value));
        }
        TransactionKind::Transfer(t) => {
            output.push_str(&format!("  From:        {} ({})\n", names.account(t.from_account()), t.from_value()));
            output.push_str(&format!("  To:          {} ({})\n", names.account(t.to_account()), t.to_value()));
        }
    }

    let category = names.category(transaction);
    if !category.is_empty() {
        output.push_str(&format!("  Category:    {}\n", category));
    }
    if let Some(description) = &transaction.description {
        output.push_str(&format!("  Description: {}\n", description));
    }
    if !transaction.tags.is_empty() {
        let tags: Vec<String> = transaction.tags.iter().map(|t| t.to_string()).collect();
        output.push_str(&format!("  Tags:        {}\n", tags.join(", ")));
    }
    output
}

/// Truncate a string to a maximum number of characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
