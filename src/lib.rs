//! walletbook - personal finance ledger
//!
//! This library provides the core functionality for the `wallet` command:
//! accounts, categories, tags, settled and planned transactions, currency
//! conversion, filtered reports with reusable templates, and CSV/JSON export.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, transactions, categories, tags)
//! - `mapper`: Translation between persisted records and models
//! - `storage`: JSON file tables and memoized repositories
//! - `rates`: Currency conversion
//! - `services`: Business logic layer
//! - `reports`: Report filter, statistics, grouping and templates
//! - `export`: CSV and JSON export/import
//! - `display` and `cli`: The command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use walletbook::config::{paths::WalletPaths, settings::Settings};
//! use walletbook::storage::Storage;
//!
//! let paths = WalletPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths, &settings)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod mapper;
pub mod models;
pub mod rates;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{WalletError, WalletResult};
