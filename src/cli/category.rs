//! Category CLI commands
//!
//! Implements CLI commands for category management.

use clap::Subcommand;

use crate::display::category::format_category_list;
use crate::error::{WalletError, WalletResult};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories in their manual order
    List,

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// Display color as hex (e.g. "ff8800")
        #[arg(long)]
        color: Option<String>,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Move a category to a position in the list (1 is first)
    Move {
        /// Category name or ID
        category: String,
        /// Target position
        #[arg(short, long)]
        to: usize,
    },

    /// Remove a category
    Remove {
        /// Category name or ID
        category: String,
    },
}

fn parse_color(input: &str) -> WalletResult<i32> {
    let hex = input.trim().trim_start_matches('#');
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|rgb| *rgb <= 0x00ff_ffff)
        .map(|rgb| (0xff00_0000 | rgb) as i32)
        .ok_or_else(|| {
            WalletError::Validation(format!("Invalid color '{}'. Use hex like 'ff8800'", input))
        })
}

/// Handle a category command
pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> WalletResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            let categories = service.list()?;
            print!("{}", format_category_list(&categories));
        }

        CategoryCommands::Create { name, color } => {
            let color = color.as_deref().map(parse_color).transpose()?;
            let category = service.create(&name, color)?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Rename { category, name } => {
            let found = service.require(&category)?;
            let updated = service.rename(found.id, &name)?;
            println!("Renamed category: {} -> {}", found.name, updated.name);
        }

        CategoryCommands::Move { category, to } => {
            let found = service.require(&category)?;
            let ordered = service.reorder(found.id, to.saturating_sub(1))?;
            print!("{}", format_category_list(&ordered));
        }

        CategoryCommands::Remove { category } => {
            let found = service.require(&category)?;
            let removed = service.remove(found.id)?;
            println!("Removed category: {}", removed.name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#00ff00").unwrap() & 0x00ff_ffff, 0x00ff00);
        assert!(parse_color("zzz").is_err());
        assert!(parse_color("1ffffff").is_err());
    }
}
