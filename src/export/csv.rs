//! CSV export and import of transactions
//!
//! Every row, header included, has exactly [`COLUMN_COUNT`] fields.
//! Transfers leave `Amount`/`Currency` blank and use the transfer and
//! receive columns instead. The importer reads the same layout back.

use std::collections::HashMap;
use std::io::{Read, Write};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::error::{WalletError, WalletResult};
use crate::models::{
    Account, AccountId, AssetCode, Category, CategoryId, Flow, Money, NotBlankTrimmedString,
    PositiveAmount, Transaction, TransactionId, TransactionKind, TransactionTime, TransactionType,
    Transfer, Value,
};
use crate::services::{AccountService, CategoryService};
use crate::storage::Storage;

pub const COLUMN_COUNT: usize = 15;

pub const CSV_HEADER: [&str; COLUMN_COUNT] = [
    "Date",
    "Title",
    "Category",
    "Account",
    "Amount",
    "Currency",
    "Type",
    "Transfer Amount",
    "Transfer Currency",
    "To Account",
    "Receive Amount",
    "Receive Currency",
    "Description",
    "Due Date",
    "ID",
];

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

mod col {
    pub const DATE: usize = 0;
    pub const TITLE: usize = 1;
    pub const CATEGORY: usize = 2;
    pub const ACCOUNT: usize = 3;
    pub const AMOUNT: usize = 4;
    pub const CURRENCY: usize = 5;
    pub const TYPE: usize = 6;
    pub const TRANSFER_AMOUNT: usize = 7;
    pub const TRANSFER_CURRENCY: usize = 8;
    pub const TO_ACCOUNT: usize = 9;
    pub const RECEIVE_AMOUNT: usize = 10;
    pub const RECEIVE_CURRENCY: usize = 11;
    pub const DESCRIPTION: usize = 12;
    pub const DUE_DATE: usize = 13;
    pub const ID: usize = 14;
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format(DATE_TIME_FORMAT).to_string()
}

fn text(value: &Option<NotBlankTrimmedString>) -> String {
    value.as_ref().map(|v| v.as_str().to_string()).unwrap_or_default()
}

fn transaction_row(
    transaction: &Transaction,
    account_names: &HashMap<AccountId, &str>,
    category_names: &HashMap<CategoryId, &str>,
) -> [String; COLUMN_COUNT] {
    let mut row: [String; COLUMN_COUNT] = Default::default();
    let account_name = |id: AccountId| account_names.get(&id).copied().unwrap_or_default().to_string();

    match transaction.time {
        TransactionTime::Actual(at) => row[col::DATE] = format_time(at),
        TransactionTime::Due(at) => row[col::DUE_DATE] = format_time(at),
    }
    row[col::TITLE] = text(&transaction.title);
    row[col::CATEGORY] = transaction
        .category
        .and_then(|id| category_names.get(&id).copied())
        .unwrap_or_default()
        .to_string();
    row[col::ACCOUNT] = account_name(transaction.kind.primary_account());
    row[col::TYPE] = transaction.transaction_type().label().to_string();

    match &transaction.kind {
        TransactionKind::Income(flow) | TransactionKind::Expense(flow) => {
            row[col::AMOUNT] = flow.value.money().to_decimal_string();
            row[col::CURRENCY] = flow.value.asset.as_str().to_string();
        }
        TransactionKind::Transfer(transfer) => {
            row[col::TRANSFER_AMOUNT] = transfer.from_value().money().to_decimal_string();
            row[col::TRANSFER_CURRENCY] = transfer.from_value().asset.as_str().to_string();
            row[col::TO_ACCOUNT] = account_name(transfer.to_account());
            row[col::RECEIVE_AMOUNT] = transfer.to_value().money().to_decimal_string();
            row[col::RECEIVE_CURRENCY] = transfer.to_value().asset.as_str().to_string();
        }
    }

    row[col::DESCRIPTION] = text(&transaction.description);
    row[col::ID] = transaction.id.as_uuid().to_string();
    row
}

/// Write `transactions` as CSV. The header is written even when there are
/// no transactions. Unknown account or category names are left blank.
pub fn export_transactions_csv<W: Write>(
    writer: W,
    transactions: &[Transaction],
    accounts: &[Account],
    categories: &[Category],
) -> WalletResult<()> {
    let account_names: HashMap<_, _> = accounts.iter().map(|a| (a.id, a.name.as_str())).collect();
    let category_names: HashMap<_, _> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut csv_writer = ::csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for transaction in transactions {
        csv_writer.write_record(transaction_row(transaction, &account_names, &category_names))?;
    }
    csv_writer
        .flush()
        .map_err(|e| WalletError::Export(e.to_string()))?;

    tracing::debug!(rows = transactions.len(), "transactions exported to CSV");
    Ok(())
}

/// Parse CSV text into rows of fields. The header row, if any, is returned
/// like any other row.
pub fn read_csv(text: &str) -> WalletResult<Vec<Vec<String>>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Outcome of a CSV import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows that failed validation
    pub skipped: usize,
    /// Rows whose ID already exists
    pub duplicates: usize,
    pub created_accounts: Vec<String>,
    pub created_categories: Vec<String>,
    /// One message per skipped row, with its 1-based line number
    pub errors: Vec<String>,
}

fn parse_time(field: &str) -> Option<DateTime<Utc>> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(field, DATE_TIME_FORMAT) {
        return Some(Utc.from_utc_datetime(&at));
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(field) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(field, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|at| Utc.from_utc_datetime(&at))
}

fn parse_amount(field: &str, column: &str) -> Result<PositiveAmount, String> {
    let money = Money::parse(field).map_err(|e| format!("{}: {}", column, e))?;
    PositiveAmount::new(money).map_err(|e| format!("{}: {}", column, e))
}

/// An account named by a row, with the currency the row quotes for it
struct AccountRef<'r> {
    name: &'r str,
    currency: Option<AssetCode>,
}

/// A row that passed every check that needs no writes
enum ParsedKind<'r> {
    Flow {
        income: bool,
        amount: PositiveAmount,
        account: AccountRef<'r>,
    },
    Transfer {
        amount: PositiveAmount,
        from: AccountRef<'r>,
        receive: PositiveAmount,
        to: AccountRef<'r>,
    },
}

/// Resolves names to accounts and categories, creating missing ones
struct Resolver<'a> {
    accounts: AccountService<'a>,
    categories: CategoryService<'a>,
    summary: &'a mut ImportSummary,
}

impl Resolver<'_> {
    /// Look up an account without creating it. A row currency that differs
    /// from the stored account's asset is rejected, since records keep no
    /// asset of their own.
    fn existing(&self, account: &AccountRef<'_>) -> Result<Option<Account>, String> {
        let found = self.accounts.find(account.name).map_err(|e| e.to_string())?;
        if let (Some(found), Some(code)) = (&found, &account.currency) {
            if found.asset != *code {
                return Err(format!(
                    "currency {} does not match account '{}' ({})",
                    code, found.name, found.asset
                ));
            }
        }
        Ok(found)
    }

    fn account(&mut self, account: &AccountRef<'_>, existing: Option<Account>) -> WalletResult<Account> {
        if let Some(found) = existing {
            return Ok(found);
        }
        let created = self
            .accounts
            .create(account.name, account.currency.as_ref().map(AssetCode::as_str))?;
        self.summary.created_accounts.push(created.name.as_str().to_string());
        Ok(created)
    }

    fn category(&mut self, name: &str) -> WalletResult<Option<CategoryId>> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        if let Some(category) = self.categories.find(name)? {
            return Ok(Some(category.id));
        }
        let category = self.categories.create(name, None)?;
        self.summary
            .created_categories
            .push(category.name.as_str().to_string());
        Ok(Some(category.id))
    }
}

fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or_default()
}

fn account_ref(row: &[String], name_col: usize, currency_col: usize) -> Result<AccountRef<'_>, String> {
    let currency = match field(row, currency_col) {
        "" => None,
        code => Some(
            AssetCode::new(code).map_err(|e| format!("{}: {}", CSV_HEADER[currency_col], e))?,
        ),
    };
    match field(row, name_col) {
        "" => Err(format!("missing {}", CSV_HEADER[name_col])),
        name => Ok(AccountRef { name, currency }),
    }
}

fn parse_kind(row: &[String]) -> Result<ParsedKind<'_>, String> {
    let transaction_type = TransactionType::parse(field(row, col::TYPE))
        .ok_or_else(|| format!("unknown type '{}'", field(row, col::TYPE)))?;

    match transaction_type {
        TransactionType::Income | TransactionType::Expense => Ok(ParsedKind::Flow {
            income: transaction_type == TransactionType::Income,
            amount: parse_amount(field(row, col::AMOUNT), "Amount")?,
            account: account_ref(row, col::ACCOUNT, col::CURRENCY)?,
        }),
        TransactionType::Transfer => {
            let from = account_ref(row, col::ACCOUNT, col::TRANSFER_CURRENCY)?;
            let to = account_ref(row, col::TO_ACCOUNT, col::RECEIVE_CURRENCY)?;
            if from.name.to_lowercase() == to.name.to_lowercase() {
                return Err(format!("transfer from '{}' to itself", from.name));
            }
            Ok(ParsedKind::Transfer {
                amount: parse_amount(field(row, col::TRANSFER_AMOUNT), "Transfer Amount")?,
                from,
                receive: parse_amount(field(row, col::RECEIVE_AMOUNT), "Receive Amount")?,
                to,
            })
        }
    }
}

/// Validate the whole row first, then resolve names. Nothing is created
/// for a row that ends up skipped.
fn row_to_transaction(row: &[String], resolver: &mut Resolver<'_>) -> Result<Transaction, String> {
    if row.len() != COLUMN_COUNT {
        return Err(format!("expected {} fields, found {}", COLUMN_COUNT, row.len()));
    }

    let id = match field(row, col::ID) {
        "" => TransactionId::new(),
        raw => TransactionId::from_uuid(Uuid::parse_str(raw).map_err(|e| format!("ID: {}", e))?),
    };

    let time = match (parse_time(field(row, col::DATE)), parse_time(field(row, col::DUE_DATE))) {
        (Some(at), _) => TransactionTime::Actual(at),
        (None, Some(at)) => TransactionTime::Due(at),
        (None, None) => return Err("no Date or Due Date".to_string()),
    };

    let kind = match parse_kind(row)? {
        ParsedKind::Flow {
            income,
            amount,
            account,
        } => {
            let existing = resolver.existing(&account)?;
            let account = resolver
                .account(&account, existing)
                .map_err(|e| e.to_string())?;
            let flow = Flow::new(account.id, Value::new(amount, account.asset));
            if income {
                TransactionKind::Income(flow)
            } else {
                TransactionKind::Expense(flow)
            }
        }
        ParsedKind::Transfer {
            amount,
            from,
            receive,
            to,
        } => {
            let existing_from = resolver.existing(&from)?;
            let existing_to = resolver.existing(&to)?;
            if let (Some(a), Some(b)) = (&existing_from, &existing_to) {
                if a.id == b.id {
                    return Err(format!("transfer from '{}' to itself", a.name));
                }
            }
            let from = resolver
                .account(&from, existing_from)
                .map_err(|e| e.to_string())?;
            let to = resolver.account(&to, existing_to).map_err(|e| e.to_string())?;
            let transfer = Transfer::new(
                from.id,
                Value::new(amount, from.asset),
                to.id,
                Value::new(receive, to.asset),
            )
            .map_err(|e| e.to_string())?;
            TransactionKind::Transfer(transfer)
        }
    };

    let category = resolver
        .category(field(row, col::CATEGORY))
        .map_err(|e| e.to_string())?;

    let mut transaction = Transaction::new(kind, time)
        .with_title(NotBlankTrimmedString::optional(Some(field(row, col::TITLE))))
        .with_description(NotBlankTrimmedString::optional(Some(field(row, col::DESCRIPTION))))
        .with_category(category);
    transaction.id = id;
    Ok(transaction)
}

/// Import transactions in the export layout. A leading header row is
/// skipped. Invalid rows are counted as skipped; rows whose ID is already
/// stored are counted as duplicates.
pub fn import_transactions_csv<R: Read>(storage: &Storage, mut reader: R) -> WalletResult<ImportSummary> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| WalletError::Import(e.to_string()))?;
    let rows = read_csv(&text)?;

    let mut summary = ImportSummary::default();
    let mut imported = Vec::new();

    {
        let mut resolver = Resolver {
            accounts: AccountService::new(storage),
            categories: CategoryService::new(storage),
            summary: &mut summary,
        };

        for (index, row) in rows.iter().enumerate() {
            let line = index + 1;
            if index == 0 && row.first().map(|s| s.trim()) == Some(CSV_HEADER[0]) {
                continue;
            }
            if row.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            if let Ok(uuid) = Uuid::parse_str(field(row, col::ID)) {
                let id = TransactionId::from_uuid(uuid);
                let seen = imported.iter().any(|t: &Transaction| t.id == id);
                if seen || storage.transactions.find_by_id(id)?.is_some() {
                    resolver.summary.duplicates += 1;
                    continue;
                }
            }

            match row_to_transaction(row, &mut resolver) {
                Ok(transaction) => imported.push(transaction),
                Err(reason) => {
                    tracing::warn!(line, %reason, "skipping CSV row");
                    resolver.summary.skipped += 1;
                    resolver.summary.errors.push(format!("line {}: {}", line, reason));
                }
            }
        }
    }

    summary.imported = imported.len();
    storage.transactions.save_many(imported)?;

    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        duplicates = summary.duplicates,
        "CSV import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, WalletPaths};
    use crate::services::{FlowInput, TransactionService, TransferInput};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = WalletPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    fn at(s: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(&NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT).unwrap())
    }

    fn seed(storage: &Storage) -> Vec<Transaction> {
        let accounts = AccountService::new(storage);
        let cash = accounts.create("Cash", None).unwrap();
        let euro = accounts.create("Euro", Some("EUR")).unwrap();
        let food = CategoryService::new(storage).create("Food, drinks", None).unwrap();
        let service = TransactionService::new(storage);

        let lunch = service
            .add_expense(
                FlowInput::new(cash.id, Money::from_cents(1250), TransactionTime::Actual(at("2025-01-15 12:30:00")))
                    .title("Lunch \"special\"")
                    .category(food.id),
            )
            .unwrap();
        let transfer = service
            .add_transfer(TransferInput {
                from: cash.id,
                amount: Money::from_cents(10000),
                to: euro.id,
                to_amount: Some(Money::from_cents(9200)),
                title: Some("Exchange".into()),
                description: None,
                time: TransactionTime::Actual(at("2025-01-16 09:00:00")),
            })
            .unwrap();
        let rent = service
            .add_expense(FlowInput::new(cash.id, Money::from_cents(90000), TransactionTime::Due(at("2025-02-01 00:00:00"))))
            .unwrap();
        vec![lunch, transfer, rent]
    }

    fn export(storage: &Storage) -> String {
        let mut out = Vec::new();
        export_transactions_csv(
            &mut out,
            &storage.transactions.find_all(false).unwrap(),
            &storage.accounts.find_all(true).unwrap(),
            &storage.categories.find_all(true).unwrap(),
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let mut out = Vec::new();
        export_transactions_csv(&mut out, &[], &[], &[]).unwrap();

        let rows = read_csv(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], CSV_HEADER.to_vec());
    }

    #[test]
    fn test_every_row_has_fifteen_fields() {
        let (_dir, storage) = create_test_storage();
        seed(&storage);

        let rows = read_csv(&export(&storage)).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == COLUMN_COUNT));
    }

    #[test]
    fn test_row_contents() {
        let (_dir, storage) = create_test_storage();
        let seeded = seed(&storage);

        let rows = read_csv(&export(&storage)).unwrap();
        let by_id = |id: TransactionId| {
            rows.iter()
                .find(|r| r[col::ID] == id.as_uuid().to_string())
                .unwrap()
                .clone()
        };

        let lunch = by_id(seeded[0].id);
        assert_eq!(lunch[col::DATE], "2025-01-15 12:30:00");
        assert_eq!(lunch[col::TITLE], "Lunch \"special\"");
        assert_eq!(lunch[col::CATEGORY], "Food, drinks");
        assert_eq!(lunch[col::AMOUNT], "12.50");
        assert_eq!(lunch[col::TYPE], "EXPENSE");

        let transfer = by_id(seeded[1].id);
        assert_eq!(transfer[col::AMOUNT], "");
        assert_eq!(transfer[col::TRANSFER_AMOUNT], "100.00");
        assert_eq!(transfer[col::TO_ACCOUNT], "Euro");
        assert_eq!(transfer[col::RECEIVE_AMOUNT], "92.00");
        assert_eq!(transfer[col::RECEIVE_CURRENCY], "EUR");

        let rent = by_id(seeded[2].id);
        assert_eq!(rent[col::DATE], "");
        assert_eq!(rent[col::DUE_DATE], "2025-02-01 00:00:00");
    }

    #[test]
    fn test_unknown_names_are_blank() {
        let (_dir, storage) = create_test_storage();
        let seeded = seed(&storage);

        let mut out = Vec::new();
        export_transactions_csv(&mut out, &seeded[..1], &[], &[]).unwrap();
        let rows = read_csv(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(rows[1][col::ACCOUNT], "");
        assert_eq!(rows[1][col::CATEGORY], "");
    }

    #[test]
    fn test_import_into_fresh_storage() {
        let (_dir, source) = create_test_storage();
        let seeded = seed(&source);
        let csv_text = export(&source);

        let (_dir2, target) = create_test_storage();
        let summary = import_transactions_csv(&target, csv_text.as_bytes()).unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.created_accounts.len(), 2);
        assert_eq!(summary.created_categories, vec!["Food, drinks"]);

        let euro = target.accounts.find_by_name("Euro").unwrap().unwrap();
        assert_eq!(euro.asset.as_str(), "EUR");

        let lunch = target.transactions.find_by_id(seeded[0].id).unwrap().unwrap();
        assert_eq!(lunch.title, seeded[0].title);
        assert_eq!(lunch.time, seeded[0].time);
        assert!(!target.transactions.find_by_id(seeded[2].id).unwrap().unwrap().settled());
    }

    #[test]
    fn test_reimport_counts_duplicates_and_skips_bad_rows() {
        let (_dir, storage) = create_test_storage();
        seed(&storage);
        let mut csv_text = export(&storage);
        csv_text.push_str(",Broken,,Cash,-5.00,USD,EXPENSE,,,,,,,,\n");
        csv_text.push_str("2025-01-20 10:00:00,Short row\n");

        let summary = import_transactions_csv(&storage, csv_text.as_bytes()).unwrap();
        assert_eq!(summary.duplicates, 3);
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.errors.len(), 2);
    }

    fn csv_row(fields: &[(usize, &str)]) -> String {
        let mut row = vec![""; COLUMN_COUNT];
        for (column, value) in fields {
            row[*column] = value;
        }
        format!("{}\n", row.join(","))
    }

    #[test]
    fn test_currency_must_match_existing_account() {
        let (dir, storage) = create_test_storage();
        AccountService::new(&storage).create("Cash", Some("USD")).unwrap();

        let mut csv_text = csv_row(&[
            (col::DATE, "2025-01-01 00:00:00"),
            (col::ACCOUNT, "Cash"),
            (col::AMOUNT, "10.00"),
            (col::CURRENCY, "EUR"),
            (col::TYPE, "INCOME"),
        ]);
        csv_text.push_str(&csv_row(&[
            (col::DATE, "2025-01-02 00:00:00"),
            (col::ACCOUNT, "Cash"),
            (col::AMOUNT, "20.00"),
            (col::CURRENCY, "usd"),
            (col::TYPE, "INCOME"),
        ]));

        let summary = import_transactions_csv(&storage, csv_text.as_bytes()).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);
        assert!(summary.errors[0].contains("does not match account 'Cash'"));

        let cached = storage.transactions.find_all(false).unwrap();
        let reopened = Storage::new(
            WalletPaths::with_base_dir(dir.path().to_path_buf()),
            &Settings::default(),
        )
        .unwrap();
        let reloaded = reopened.transactions.find_all(false).unwrap();
        assert_eq!(cached, reloaded);
        assert_eq!(reloaded[0].kind.primary_value().asset.as_str(), "USD");
    }

    #[test]
    fn test_skipped_row_creates_nothing() {
        let (_dir, storage) = create_test_storage();
        let mut csv_text = csv_row(&[
            (col::DATE, "2025-01-01 00:00:00"),
            (col::ACCOUNT, "Ghost"),
            (col::TYPE, "TRANSFER"),
            (col::TRANSFER_AMOUNT, "5.00"),
            (col::TO_ACCOUNT, "ghost"),
            (col::RECEIVE_AMOUNT, "5.00"),
        ]);
        csv_text.push_str(&csv_row(&[
            (col::DATE, "2025-01-01 00:00:00"),
            (col::CATEGORY, "Phantom"),
            (col::ACCOUNT, "Nobody"),
            (col::AMOUNT, "100000000000000000"),
            (col::TYPE, "EXPENSE"),
        ]));

        let summary = import_transactions_csv(&storage, csv_text.as_bytes()).unwrap();
        assert_eq!(summary.skipped, 2);
        assert!(summary.created_accounts.is_empty());
        assert!(summary.created_categories.is_empty());
        assert!(storage.accounts.find_all(true).unwrap().is_empty());
        assert!(storage.categories.find_all(true).unwrap().is_empty());
    }
}
