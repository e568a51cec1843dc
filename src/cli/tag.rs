//! Tag CLI commands

use clap::Subcommand;

use crate::display::category::format_tag_list;
use crate::error::WalletResult;
use crate::services::{TagService, TransactionService};
use crate::storage::Storage;

/// Tag subcommands
#[derive(Subcommand)]
pub enum TagCommands {
    /// Create a tag
    Create {
        /// Tag name (a leading '#' is dropped)
        name: String,
    },
    /// List all tags
    List,
    /// Delete a tag and detach it from every transaction
    Delete {
        /// Tag name or ID
        tag: String,
    },
    /// Attach a tag to a transaction
    Attach {
        /// Tag name or ID
        tag: String,
        /// Transaction ID
        transaction: String,
    },
    /// Detach a tag from a transaction
    Detach {
        /// Tag name or ID
        tag: String,
        /// Transaction ID
        transaction: String,
    },
}

/// Handle a tag command
pub fn handle_tag_command(storage: &Storage, cmd: TagCommands) -> WalletResult<()> {
    let service = TagService::new(storage);
    let transactions = TransactionService::new(storage);

    match cmd {
        TagCommands::Create { name } => {
            let tag = service.create(&name)?;
            println!("Created tag: #{}", tag.name);
        }
        TagCommands::List => {
            print!("{}", format_tag_list(&service.list()?));
        }
        TagCommands::Delete { tag } => {
            let found = service.require(&tag)?;
            service.delete(found.id)?;
            println!("Deleted tag: #{}", found.name);
        }
        TagCommands::Attach { tag, transaction } => {
            let found = service.require(&tag)?;
            let txn = transactions.require(&transaction)?;
            service.attach(found.id, txn.id)?;
            println!("Tagged {} with #{}", txn.id, found.name);
        }
        TagCommands::Detach { tag, transaction } => {
            let found = service.require(&tag)?;
            let txn = transactions.require(&transaction)?;
            service.detach(found.id, txn.id)?;
            println!("Removed #{} from {}", found.name, txn.id);
        }
    }

    Ok(())
}
