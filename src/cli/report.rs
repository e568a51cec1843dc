//! Report CLI command
//!
//! Builds a report filter from flags, optionally starting from a saved
//! template, and prints the resulting report.

use std::fs::File;
use std::io::{BufWriter, IsTerminal};
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use super::{parse_datetime, parse_money};
use crate::display::report::{format_report, format_template_list};
use crate::display::transaction::Names;
use crate::error::{WalletError, WalletResult};
use crate::models::TransactionType;
use crate::reports::{
    AmountBound, CategoryKey, ClearTarget, IntervalType, KeywordKind, PlannedPaymentType, ReportEvent,
    ReportFilterEvent, ReportViewModel, TimePeriod,
};
use crate::services::{AccountService, CategoryService};
use crate::storage::Storage;

/// Report flags
#[derive(Args, Default)]
pub struct ReportArgs {
    /// Transaction type to include (income, expense, transfer); repeatable
    #[arg(short = 'T', long = "type")]
    types: Vec<String>,

    /// Calendar month (YYYY-MM)
    #[arg(long, conflicts_with_all = ["from", "to", "last"])]
    month: Option<String>,

    /// Start date (inclusive)
    #[arg(long)]
    from: Option<String>,

    /// End date (exclusive)
    #[arg(long)]
    to: Option<String>,

    /// Last N intervals up to now, e.g. "30d", "4w", "6m", "1y"
    #[arg(long, conflicts_with_all = ["from", "to"])]
    last: Option<String>,

    /// Account name or ID; repeatable
    #[arg(short, long = "account")]
    accounts: Vec<String>,

    /// Category name or ID, or "uncategorized"; repeatable
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Minimum amount
    #[arg(long)]
    min: Option<String>,

    /// Maximum amount
    #[arg(long)]
    max: Option<String>,

    /// Keyword the title or description must contain; repeatable
    #[arg(long = "include")]
    include: Vec<String>,

    /// Keyword the title or description must not contain; repeatable
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Include planned payments due in the future
    #[arg(long)]
    upcoming: bool,

    /// Include planned payments past their due date
    #[arg(long)]
    overdue: bool,

    /// Count transfers between accounts as income and expense
    #[arg(long)]
    transfers_as_income_expense: bool,

    /// Start from a saved template
    #[arg(long)]
    template: Option<String>,

    /// Save the resulting filter as a template
    #[arg(long, value_name = "NAME")]
    save_template: Option<String>,

    /// List saved templates and exit
    #[arg(long)]
    templates: bool,

    /// Delete a saved template and exit
    #[arg(long, value_name = "NAME")]
    delete_template: Option<String>,

    /// Write the matching transactions as CSV to this file
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,
}

/// Parse "30d", "4w", "6m" or "1y"
fn parse_last(input: &str) -> WalletResult<TimePeriod> {
    let input = input.trim();
    let invalid = || {
        WalletError::Validation(format!(
            "Invalid period '{}'. Use a count and unit, e.g. 30d, 4w, 6m, 1y",
            input
        ))
    };
    let split = input.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
    let (count, unit) = input.split_at(split);
    let n: u32 = count.parse().map_err(|_| invalid())?;
    let interval = match unit {
        "d" => IntervalType::Day,
        "w" => IntervalType::Week,
        "m" => IntervalType::Month,
        "y" => IntervalType::Year,
        other => IntervalType::parse(other).ok_or_else(invalid)?,
    };
    Ok(TimePeriod::LastN { n, interval })
}

fn parse_month(input: &str) -> WalletResult<TimePeriod> {
    let invalid = || WalletError::Validation(format!("Invalid month '{}'. Use YYYY-MM", input));
    let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok(TimePeriod::Month { year, month })
}

fn period(args: &ReportArgs) -> WalletResult<Option<TimePeriod>> {
    if let Some(month) = &args.month {
        return parse_month(month).map(Some);
    }
    if let Some(last) = &args.last {
        return parse_last(last).map(Some);
    }
    if args.from.is_some() || args.to.is_some() {
        return Ok(Some(TimePeriod::Range {
            from: args.from.as_deref().map(parse_datetime).transpose()?,
            to: args.to.as_deref().map(parse_datetime).transpose()?,
        }));
    }
    Ok(None)
}

/// Translate flags into filter events
fn filter_events(storage: &Storage, args: &ReportArgs) -> WalletResult<Vec<ReportFilterEvent>> {
    let mut events = Vec::new();

    for kind in &args.types {
        let transaction_type = TransactionType::parse(kind).ok_or_else(|| {
            WalletError::Validation(format!(
                "Invalid transaction type: '{}'. Valid types: income, expense, transfer",
                kind
            ))
        })?;
        events.push(ReportFilterEvent::SelectType {
            transaction_type,
            checked: true,
        });
    }

    if let Some(period) = period(args)? {
        events.push(ReportFilterEvent::SelectPeriod(Some(period)));
    }

    if !args.accounts.is_empty() {
        let service = AccountService::new(storage);
        events.push(ReportFilterEvent::Clear(ClearTarget::Accounts));
        for account in &args.accounts {
            events.push(ReportFilterEvent::ToggleAccount(service.require(account)?.id));
        }
    }

    if !args.categories.is_empty() {
        let service = CategoryService::new(storage);
        events.push(ReportFilterEvent::Clear(ClearTarget::Categories));
        for category in &args.categories {
            let key = if category.trim().eq_ignore_ascii_case("uncategorized") {
                CategoryKey::Uncategorized
            } else {
                CategoryKey::Category(service.require(category)?.id)
            };
            events.push(ReportFilterEvent::ToggleCategory(key));
        }
    }

    for (bound, value) in [(AmountBound::Min, &args.min), (AmountBound::Max, &args.max)] {
        if let Some(value) = value {
            events.push(ReportFilterEvent::SetAmount {
                bound,
                amount: Some(parse_money(value)?),
            });
        }
    }

    for (kind, keywords) in [
        (KeywordKind::Include, &args.include),
        (KeywordKind::Exclude, &args.exclude),
    ] {
        for keyword in keywords {
            events.push(ReportFilterEvent::Keyword {
                kind,
                keyword: keyword.clone(),
                add: true,
            });
        }
    }

    for (planned, on) in [
        (PlannedPaymentType::Upcoming, args.upcoming),
        (PlannedPaymentType::Overdue, args.overdue),
    ] {
        if on {
            events.push(ReportFilterEvent::SelectPlanned { planned, add: true });
        }
    }

    if args.transfers_as_income_expense {
        events.push(ReportFilterEvent::TransfersAsIncomeExpense(true));
    }

    Ok(events)
}

/// Handle the report command
pub fn handle_report_command(storage: &Storage, args: ReportArgs) -> WalletResult<()> {
    if args.templates {
        print!("{}", format_template_list(&storage.templates.list()?));
        return Ok(());
    }
    if let Some(name) = &args.delete_template {
        let template = storage
            .templates
            .find_by_name(name)?
            .ok_or_else(|| WalletError::template_not_found(name))?;
        storage.templates.delete_by_id(template.id)?;
        println!("Deleted template: {}", template.name);
        return Ok(());
    }

    let mut vm = ReportViewModel::new(Utc::now());
    vm.load(storage)?;

    if let Some(name) = &args.template {
        let template = storage
            .templates
            .find_by_name(name)?
            .ok_or_else(|| WalletError::template_not_found(name))?;
        vm.apply_template(&template);
    }
    for event in filter_events(storage, &args)? {
        vm.on_event(ReportEvent::Filter(event));
    }

    if let Some(name) = &args.save_template {
        vm.on_event(ReportEvent::SaveTemplate(true));
        vm.on_event(ReportEvent::TemplateName(name.clone()));
        if !vm.state().show_save_template_option {
            return Err(WalletError::Validation(
                "Nothing to save: add at least one filter, and keep --min below --max".into(),
            ));
        }
        if let Some(saved) = vm.save_template(&storage.templates)? {
            println!("Saved template: {}", saved.name);
        }
    }

    if let Some(path) = &args.csv {
        let file = File::create(path)
            .map_err(|e| WalletError::Export(format!("Failed to create {}: {}", path.display(), e)))?;
        if vm.export_csv(BufWriter::new(file))? {
            println!(
                "Exported {} transactions to {}",
                vm.state().transactions.len(),
                path.display()
            );
        } else {
            println!("No transactions to export.");
        }
        return Ok(());
    }

    let accounts = storage.accounts.find_all(true)?;
    let categories = storage.categories.find_all(true)?;
    let names = Names::new(&accounts, &categories);
    let colored = std::io::stdout().is_terminal();
    print!("{}", format_report(vm.state(), &names, colored));

    Ok(())
}
