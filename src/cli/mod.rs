//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod category;
pub mod export;
pub mod import;
pub mod rates;
pub mod report;
pub mod tag;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use export::{handle_export_command, ExportCommands};
pub use import::{handle_import_command, ImportCommands};
pub use rates::{handle_rates_command, RatesCommands};
pub use report::{handle_report_command, ReportArgs};
pub use tag::{handle_tag_command, TagCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{WalletError, WalletResult};
use crate::models::Money;

/// Parse a user-entered amount such as `12.50` or `$12`
pub(crate) fn parse_money(input: &str) -> WalletResult<Money> {
    Money::parse(input).map_err(|e| {
        WalletError::Validation(format!(
            "Invalid amount '{}'. Use a format like '12.50'. Error: {}",
            input, e
        ))
    })
}

/// Parse `YYYY-MM-DD` (midnight UTC), `YYYY-MM-DD HH:MM` or RFC 3339
pub(crate) fn parse_datetime(input: &str) -> WalletResult<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            WalletError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM",
                input
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("12.50").unwrap(), Money::from_cents(1250));
        assert!(parse_money("twelve").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_datetime_formats() {
        let midnight = parse_datetime("2025-03-01").unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        let minute = parse_datetime("2025-03-01 14:30").unwrap();
        assert_eq!(minute, Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 0).unwrap());
        assert!(parse_datetime("2025-03-01T14:30:00Z").is_ok());
        assert!(parse_datetime("March 1st").is_err());
    }
}
