//! Export module for walletbook
//!
//! - CSV: transactions in a fixed 15-column layout, readable back by the
//!   importer
//! - JSON: full backup of every entity

pub mod csv;
pub mod json;

pub use self::csv::{
    export_transactions_csv, import_transactions_csv, read_csv, ImportSummary, CSV_HEADER,
};
pub use json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
