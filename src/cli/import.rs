//! CLI commands for importing data
//!
//! CSV files in the export format are imported row by row; accounts and
//! categories named in the file are created when missing.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::{WalletError, WalletResult};
use crate::export::{import_from_json, import_transactions_csv};
use crate::storage::Storage;

/// Import subcommands
#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Import transactions from a CSV file
    Csv {
        /// Path to CSV file
        file: PathBuf,
    },
    /// Check a JSON backup file without importing it
    Verify {
        /// Path to JSON file
        file: PathBuf,
    },
}

fn open(path: &Path) -> WalletResult<File> {
    if !path.exists() {
        return Err(WalletError::Import(format!("File not found: {}", path.display())));
    }
    File::open(path)
        .map_err(|e| WalletError::Import(format!("Failed to read {}: {}", path.display(), e)))
}

/// Handle import commands
pub fn handle_import_command(storage: &Storage, cmd: ImportCommands) -> WalletResult<()> {
    match cmd {
        ImportCommands::Csv { file } => {
            let reader = BufReader::new(open(&file)?);
            let summary = import_transactions_csv(storage, reader)?;

            println!("Import from '{}'", file.display());
            println!("{}", "=".repeat(40));
            println!("  Imported:    {}", summary.imported);
            println!("  Duplicates:  {}", summary.duplicates);
            println!("  Skipped:     {}", summary.skipped);
            if !summary.created_accounts.is_empty() {
                println!("  New accounts:   {}", summary.created_accounts.join(", "));
            }
            if !summary.created_categories.is_empty() {
                println!("  New categories: {}", summary.created_categories.join(", "));
            }
            if !summary.errors.is_empty() {
                println!();
                println!("Errors:");
                for error in summary.errors.iter().take(10) {
                    println!("  {}", error);
                }
                if summary.errors.len() > 10 {
                    println!("  ... and {} more", summary.errors.len() - 10);
                }
            }
        }

        ImportCommands::Verify { file } => {
            let text = std::fs::read_to_string(&file).map_err(|e| {
                WalletError::Import(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let export = import_from_json(&text)?;
            println!(
                "Valid backup (schema {}, exported {})",
                export.schema_version,
                export.exported_at.format("%Y-%m-%d %H:%M UTC")
            );
            println!(
                "  {} accounts, {} categories, {} transactions, {} tags",
                export.accounts.len(),
                export.categories.len(),
                export.transactions.len(),
                export.tags.len()
            );
        }
    }

    Ok(())
}
