//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for the command-line front end.

pub mod account;
pub mod category;
pub mod report;
pub mod transaction;

pub use account::{format_account_details, format_account_list};
pub use category::{format_category_list, format_tag_list};
pub use report::{format_rate_list, format_report, format_template_list};
pub use transaction::{
    format_transaction_details, format_transaction_register, format_transaction_row, Names,
};
