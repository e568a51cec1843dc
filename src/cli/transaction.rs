//! Transaction CLI commands
//!
//! Implements CLI commands for recording income, expenses and transfers,
//! settling planned payments and browsing the register.

use chrono::Utc;
use clap::{Args, Subcommand};

use super::{parse_datetime, parse_money};
use crate::display::transaction::{
    format_transaction_details, format_transaction_register, Names,
};
use crate::error::WalletResult;
use crate::models::{TransactionTime, TransactionType};
use crate::services::{
    AccountService, CategoryService, FlowInput, TagService, TransactionService, TransferInput,
};
use crate::storage::Storage;

/// Arguments shared by income and expense
#[derive(Args)]
pub struct FlowArgs {
    /// Account name or ID
    account: String,
    /// Amount (e.g. "50.00")
    amount: String,
    /// Title
    #[arg(short, long)]
    title: Option<String>,
    /// Description
    #[arg(long)]
    description: Option<String>,
    /// Category name or ID
    #[arg(short, long)]
    category: Option<String>,
    /// Date (YYYY-MM-DD or YYYY-MM-DD HH:MM), defaults to now
    #[arg(short, long)]
    date: Option<String>,
    /// Record as a planned payment due at the date
    #[arg(long)]
    planned: bool,
    /// Tag name (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,
}

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record income into an account
    Income(FlowArgs),
    /// Record an expense from an account
    Expense(FlowArgs),
    /// Move money between two accounts
    Transfer {
        /// Source account name or ID
        from: String,
        /// Destination account name or ID
        to: String,
        /// Amount leaving the source account
        amount: String,
        /// Amount arriving, when the accounts use different currencies
        #[arg(long)]
        receive: Option<String>,
        /// Title
        #[arg(short, long)]
        title: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Date (YYYY-MM-DD or YYYY-MM-DD HH:MM), defaults to now
        #[arg(short, long)]
        date: Option<String>,
        /// Record as a planned transfer due at the date
        #[arg(long)]
        planned: bool,
    },
    /// Settle a planned transaction
    Settle {
        /// Transaction ID
        id: String,
        /// Settlement date, defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List transactions
    List {
        /// Filter by account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by type (income, expense, transfer)
        #[arg(short = 'T', long = "type")]
        transaction_type: Option<String>,
        /// Only planned transactions
        #[arg(long)]
        planned: bool,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID
        id: String,
    },
    /// Set or clear the category of a transaction
    Categorize {
        /// Transaction ID
        id: String,
        /// Category name or ID; omit to clear
        category: Option<String>,
    },
    /// Remove a transaction
    Remove {
        /// Transaction ID
        id: String,
    },
}

fn transaction_time(date: Option<&str>, planned: bool) -> WalletResult<TransactionTime> {
    let at = match date {
        Some(date) => parse_datetime(date)?,
        None => Utc::now(),
    };
    Ok(if planned {
        TransactionTime::Due(at)
    } else {
        TransactionTime::Actual(at)
    })
}

fn flow_input(storage: &Storage, args: FlowArgs) -> WalletResult<FlowInput> {
    let account = AccountService::new(storage).require(&args.account)?;
    let category = match args.category.as_deref() {
        Some(name) => Some(CategoryService::new(storage).require(name)?.id),
        None => None,
    };
    let tag_service = TagService::new(storage);
    let tags = args
        .tags
        .iter()
        .map(|name| tag_service.require(name).map(|tag| tag.id))
        .collect::<WalletResult<Vec<_>>>()?;

    Ok(FlowInput {
        account: account.id,
        amount: parse_money(&args.amount)?,
        title: args.title,
        description: args.description,
        category,
        time: transaction_time(args.date.as_deref(), args.planned)?,
        tags,
    })
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    cmd: TransactionCommands,
) -> WalletResult<()> {
    let service = TransactionService::new(storage);
    let account_service = AccountService::new(storage);

    match cmd {
        TransactionCommands::Income(args) => {
            let txn = service.add_income(flow_input(storage, args)?)?;
            println!("Recorded income {} ({})", txn.kind.primary_value(), txn.id);
        }

        TransactionCommands::Expense(args) => {
            let txn = service.add_expense(flow_input(storage, args)?)?;
            println!("Recorded expense {} ({})", txn.kind.primary_value(), txn.id);
        }

        TransactionCommands::Transfer {
            from,
            to,
            amount,
            receive,
            title,
            description,
            date,
            planned,
        } => {
            let from = account_service.require(&from)?;
            let to = account_service.require(&to)?;
            let txn = service.add_transfer(TransferInput {
                from: from.id,
                amount: parse_money(&amount)?,
                to: to.id,
                to_amount: receive.as_deref().map(parse_money).transpose()?,
                title,
                description,
                time: transaction_time(date.as_deref(), planned)?,
            })?;
            println!("Recorded transfer {} -> {} ({})", from.name, to.name, txn.id);
        }

        TransactionCommands::Settle { id, date } => {
            let found = service.require(&id)?;
            let at = match date {
                Some(date) => parse_datetime(&date)?,
                None => Utc::now(),
            };
            let settled = service.settle(found.id, at)?;
            println!(
                "Settled {} on {}",
                settled.id,
                settled.timestamp().format("%Y-%m-%d")
            );
        }

        TransactionCommands::List {
            account,
            transaction_type,
            planned,
            limit,
        } => {
            let mut transactions = match account {
                Some(account) => {
                    let account = account_service.require(&account)?;
                    service.list_for_account(account.id)?
                }
                None => service.list()?,
            };
            if let Some(kind) = transaction_type {
                let kind = TransactionType::parse(&kind).ok_or_else(|| {
                    crate::error::WalletError::Validation(format!(
                        "Invalid transaction type: '{}'. Valid types: income, expense, transfer",
                        kind
                    ))
                })?;
                transactions.retain(|t| t.transaction_type() == kind);
            }
            if planned {
                transactions.retain(|t| !t.settled());
            }
            transactions.truncate(limit);

            let accounts = storage.accounts.find_all(true)?;
            let categories = storage.categories.find_all(true)?;
            let names = Names::new(&accounts, &categories);
            print!("{}", format_transaction_register(&transactions, &names));
        }

        TransactionCommands::Show { id } => {
            let txn = service.require(&id)?;
            let accounts = storage.accounts.find_all(true)?;
            let categories = storage.categories.find_all(true)?;
            let names = Names::new(&accounts, &categories);
            print!("{}", format_transaction_details(&txn, &names));
        }

        TransactionCommands::Categorize { id, category } => {
            let txn = service.require(&id)?;
            let category = match category {
                Some(name) => Some(CategoryService::new(storage).require(&name)?),
                None => None,
            };
            service.set_category(txn.id, category.as_ref().map(|c| c.id))?;
            match category {
                Some(category) => println!("Categorized {} as {}", txn.id, category.name),
                None => println!("Cleared category of {}", txn.id),
            }
        }

        TransactionCommands::Remove { id } => {
            let txn = service.require(&id)?;
            let removed = service.remove(txn.id)?;
            println!("Removed transaction {}", removed.id);
        }
    }

    Ok(())
}
