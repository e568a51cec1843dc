use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walletbook::cli::{
    handle_account_command, handle_category_command, handle_export_command,
    handle_import_command, handle_rates_command, handle_report_command, handle_tag_command,
    handle_transaction_command,
};
use walletbook::config::{paths::WalletPaths, settings::Settings};
use walletbook::models::AssetCode;
use walletbook::storage::Storage;

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "WALLETBOOK_LOG";

#[derive(Parser)]
#[command(
    name = "wallet",
    version,
    about = "Personal finance ledger for the terminal",
    long_about = "walletbook keeps accounts, categories and transactions in plain \
                  JSON files, tracks planned payments, and builds filtered reports \
                  that can be saved as templates and exported to CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init {
        /// Base currency for reports and new accounts
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// Show current configuration and paths
    Config,

    /// Account management commands
    #[command(subcommand)]
    Account(walletbook::cli::AccountCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(walletbook::cli::CategoryCommands),

    /// Tag management commands
    #[command(subcommand)]
    Tag(walletbook::cli::TagCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(walletbook::cli::TransactionCommands),

    /// Filtered report with totals and a dated history
    Report(walletbook::cli::ReportArgs),

    /// Export data
    #[command(subcommand)]
    Export(walletbook::cli::ExportCommands),

    /// Import data
    #[command(subcommand)]
    Import(walletbook::cli::ImportCommands),

    /// Exchange rate management
    #[command(subcommand)]
    Rates(walletbook::cli::RatesCommands),
}

fn init_tracing(settings: &Settings) {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .ok()
        .or_else(|| {
            settings
                .log_filter
                .as_deref()
                .and_then(|directive| tracing_subscriber::EnvFilter::try_new(directive).ok())
        })
        .unwrap_or_else(|| "walletbook=warn".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = WalletPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings);

    let command = match cli.command {
        Some(Commands::Init { currency }) => {
            if let Some(code) = currency {
                settings.base_currency = AssetCode::new(&code)?.as_str().to_string();
            }
            paths.ensure_directories()?;
            settings.setup_completed = true;
            settings.save(&paths)?;
            tracing::info!(dir = %paths.base_dir().display(), "initialized");
            println!("Initialized walletbook at: {}", paths.base_dir().display());
            println!("Base currency: {}", settings.base_currency);
            println!();
            println!("Run 'wallet account create <name>' to add your first account.");
            return Ok(());
        }
        Some(Commands::Config) => {
            println!("walletbook Configuration");
            println!("========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Base currency: {}", settings.base_currency);
            println!("  Date format:   {}", settings.date_format);
            println!(
                "  Log filter:    {}",
                settings.log_filter.as_deref().unwrap_or("(default)")
            );
            println!(
                "  Initialized:   {}",
                if settings.setup_completed { "Yes" } else { "No" }
            );
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("walletbook - personal finance ledger");
            println!();
            println!("Run 'wallet --help' for usage information.");
            return Ok(());
        }
    };

    // Initialize storage
    let storage = Storage::new(paths, &settings)?;

    match command {
        Commands::Account(cmd) => handle_account_command(&storage, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, cmd)?,
        Commands::Tag(cmd) => handle_tag_command(&storage, cmd)?,
        Commands::Transaction(cmd) => handle_transaction_command(&storage, cmd)?,
        Commands::Report(args) => handle_report_command(&storage, args)?,
        Commands::Export(cmd) => handle_export_command(&storage, cmd)?,
        Commands::Import(cmd) => handle_import_command(&storage, cmd)?,
        Commands::Rates(cmd) => handle_rates_command(&storage, cmd)?,
        Commands::Init { .. } | Commands::Config => {}
    }

    Ok(())
}
