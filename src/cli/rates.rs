//! Exchange rate CLI commands
//!
//! Rates are entered by hand as "1 BASE = RATE CURRENCY".

use clap::Subcommand;

use crate::display::report::format_rate_list;
use crate::error::{WalletError, WalletResult};
use crate::models::AssetCode;
use crate::storage::Storage;

/// Rate subcommands
#[derive(Subcommand)]
pub enum RatesCommands {
    /// Set the rate for a currency pair
    Set {
        /// Quoted currency (e.g. EUR)
        currency: String,
        /// Units of the quoted currency per one unit of the base
        rate: f64,
        /// Base currency (defaults to the configured base)
        #[arg(short, long)]
        base: Option<String>,
    },
    /// List stored rates
    List,
    /// Remove the rate for a currency pair
    Remove {
        /// Quoted currency
        currency: String,
        /// Base currency (defaults to the configured base)
        #[arg(short, long)]
        base: Option<String>,
    },
}

fn asset(code: &str) -> WalletResult<AssetCode> {
    AssetCode::new(code)
        .map_err(|e| WalletError::Validation(format!("Invalid currency '{}': {}", code, e)))
}

fn base_or_default(storage: &Storage, base: Option<&str>) -> WalletResult<AssetCode> {
    match base {
        Some(code) => asset(code),
        None => Ok(storage.base_currency().clone()),
    }
}

/// Handle a rates command
pub fn handle_rates_command(storage: &Storage, cmd: RatesCommands) -> WalletResult<()> {
    match cmd {
        RatesCommands::Set { currency, rate, base } => {
            let base = base_or_default(storage, base.as_deref())?;
            let currency = asset(&currency)?;
            storage.rates.set_rate(&base, &currency, rate, true)?;
            println!("Set rate: 1 {} = {} {}", base, rate, currency);
        }
        RatesCommands::List => {
            print!("{}", format_rate_list(&storage.rates.list()?));
        }
        RatesCommands::Remove { currency, base } => {
            let base = base_or_default(storage, base.as_deref())?;
            let currency = asset(&currency)?;
            if storage.rates.remove_rate(&base, &currency)? {
                println!("Removed rate {} -> {}", base, currency);
            } else {
                return Err(WalletError::NotFound {
                    entity_type: "Exchange rate",
                    identifier: format!("{} -> {}", base, currency),
                });
            }
        }
    }

    Ok(())
}
