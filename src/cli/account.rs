//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use crate::display::account::{format_account_details, format_account_list};
use crate::error::WalletResult;
use crate::services::AccountService;
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Currency code (defaults to the base currency)
        #[arg(short, long)]
        currency: Option<String>,
    },
    /// List all accounts
    List {
        /// Show archived accounts
        #[arg(short, long)]
        all: bool,
    },
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Rename an account
    Rename {
        /// Account name or ID
        account: String,
        /// New name
        name: String,
    },
    /// Archive an account
    Archive {
        /// Account name or ID
        account: String,
    },
}

/// Handle an account command
pub fn handle_account_command(storage: &Storage, cmd: AccountCommands) -> WalletResult<()> {
    let service = AccountService::new(storage);

    match cmd {
        AccountCommands::Create { name, currency } => {
            let account = service.create(&name, currency.as_deref())?;

            println!("Created account: {}", account.name);
            println!("  Currency: {}", account.asset);
            println!("  ID: {}", account.id);
        }

        AccountCommands::List { all } => {
            let summaries = service.list_with_balances(all)?;
            print!("{}", format_account_list(&summaries));
        }

        AccountCommands::Show { account } => {
            let found = service.require(&account)?;
            let summary = service
                .list_with_balances(true)?
                .into_iter()
                .find(|s| s.account.id == found.id)
                .ok_or_else(|| crate::error::WalletError::account_not_found(&account))?;
            print!("{}", format_account_details(&summary));
        }

        AccountCommands::Rename { account, name } => {
            let found = service.require(&account)?;
            let updated = service.rename(found.id, &name)?;
            println!("Renamed account: {} -> {}", found.name, updated.name);
        }

        AccountCommands::Archive { account } => {
            let found = service.require(&account)?;
            let archived = service.archive(found.id)?;
            println!("Archived account: {}", archived.name);
        }
    }

    Ok(())
}
