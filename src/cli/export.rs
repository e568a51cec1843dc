//! CLI commands for data export
//!
//! Provides commands for exporting data in various formats.

use crate::error::{WalletError, WalletResult};
use crate::export::{export_full_json, export_transactions_csv, FullExport};
use crate::storage::Storage;
use clap::Subcommand;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export transactions to CSV
    Csv {
        /// Output file path (stdout when omitted)
        output: Option<PathBuf>,
    },

    /// Export the full database to JSON
    Json {
        /// Output file path (stdout when omitted)
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show export information without writing files
    Info,
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> WalletResult<()> {
    match cmd {
        ExportCommands::Csv { output } => handle_export_csv(storage, output.as_deref()),
        ExportCommands::Json { output, pretty } => {
            handle_export_json(storage, output.as_deref(), pretty)
        }
        ExportCommands::Info => handle_export_info(storage),
    }
}

fn open_output(output: Option<&Path>) -> WalletResult<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                WalletError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

/// Handle transactions export
fn handle_export_csv(storage: &Storage, output: Option<&Path>) -> WalletResult<()> {
    let transactions = storage.transactions.find_all(false)?;
    let accounts = storage.accounts.find_all(true)?;
    let categories = storage.categories.find_all(true)?;

    let writer = open_output(output)?;
    export_transactions_csv(writer, &transactions, &accounts, &categories)?;

    if let Some(path) = output {
        println!("Exported {} transactions to: {}", transactions.len(), path.display());
    }
    Ok(())
}

/// Handle full export
fn handle_export_json(storage: &Storage, output: Option<&Path>, pretty: bool) -> WalletResult<()> {
    let mut writer = open_output(output)?;
    export_full_json(storage, &mut writer, pretty)?;
    writer.flush()?;

    if let Some(path) = output {
        println!("Full database exported to: {}", path.display());
    }
    Ok(())
}

/// Show export information
fn handle_export_info(storage: &Storage) -> WalletResult<()> {
    let export = FullExport::from_storage(storage)?;
    let meta = &export.metadata;

    println!("Export Information");
    println!("==================");
    println!("Schema version:  {}", export.schema_version);
    println!("Base currency:   {}", export.base_currency);
    println!();
    println!("Data counts:");
    println!("  Accounts:      {}", meta.account_count);
    println!("  Categories:    {}", meta.category_count);
    println!("  Transactions:  {}", meta.transaction_count);
    println!("  Tags:          {}", meta.tag_count);
    println!("  Rates:         {}", export.exchange_rates.len());

    if let (Some(earliest), Some(latest)) = (meta.earliest_transaction, meta.latest_transaction) {
        println!();
        println!(
            "Transaction range: {} to {}",
            earliest.format("%Y-%m-%d"),
            latest.format("%Y-%m-%d")
        );
    }

    Ok(())
}
