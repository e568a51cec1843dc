//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use crate::services::account::AccountSummary;

/// Format a list of accounts with balances as a table
pub fn format_account_list(summaries: &[AccountSummary]) -> String {
    if summaries.is_empty() {
        return "No accounts found.".to_string();
    }

    let name_width = summaries
        .iter()
        .map(|s| s.account.name.as_str().chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<8}  {:>14}  {}\n",
        "Name",
        "Currency",
        "Balance",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<8}  {:->14}  {:-<10}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for summary in summaries {
        let status = if summary.account.removed {
            "Archived".to_string()
        } else if summary.planned_count > 0 {
            format!("{} planned", summary.planned_count)
        } else {
            String::new()
        };

        output.push_str(&format!(
            "{:<name_width$}  {:<8}  {:>14}  {}\n",
            summary.account.name.as_str(),
            summary.account.asset.as_str(),
            summary.balance.to_string(),
            status,
            name_width = name_width,
        ));
    }

    output
}

/// Format a single account's details
pub fn format_account_details(summary: &AccountSummary) -> String {
    let account = &summary.account;

    let mut output = String::new();
    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  ID:        {}\n", account.id.as_uuid()));
    output.push_str(&format!("  Currency:  {}\n", account.asset));
    output.push_str(&format!(
        "  Archived:  {}\n",
        if account.removed { "Yes" } else { "No" }
    ));
    output.push_str(&format!("  Balance:   {}\n", summary.balance));
    output.push_str(&format!("  Planned:   {}\n", summary.planned_count));
    output.push_str(&format!(
        "  Modified:  {}\n",
        account.last_updated.format("%Y-%m-%d %H:%M UTC")
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AssetCode, Money, NotBlankTrimmedString};

    fn summary(name: &str, cents: i64, planned: usize) -> AccountSummary {
        AccountSummary {
            account: Account::new(
                NotBlankTrimmedString::new(name).unwrap(),
                AssetCode::new("USD").unwrap(),
            ),
            balance: Money::from_cents(cents),
            planned_count: planned,
        }
    }

    #[test]
    fn test_format_account_list() {
        let output = format_account_list(&[summary("Checking", 100000, 0), summary("Savings", -2550, 2)]);
        assert!(output.contains("Checking"));
        assert!(output.contains("1000.00"));
        assert!(output.contains("-25.50"));
        assert!(output.contains("2 planned"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_account_list(&[]), "No accounts found.");
    }

    #[test]
    fn test_details() {
        let output = format_account_details(&summary("Checking", 1234, 0));
        assert!(output.contains("Account: Checking"));
        assert!(output.contains("12.34"));
    }
}
