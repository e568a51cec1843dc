use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn wallet(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wallet").unwrap();
    cmd.env("WALLETBOOK_DATA_DIR", dir.path())
        .env_remove("WALLETBOOK_LOG");
    cmd
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    wallet(&dir)
        .args(["init", "--currency", "USD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Base currency: USD"));
    wallet(&dir)
        .args(["account", "create", "Checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created account: Checking"));
    dir
}

#[test]
fn config_shows_data_dir() {
    let dir = TempDir::new().unwrap();
    wallet(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.path().to_string_lossy().as_ref()));
}

#[test]
fn expense_shows_up_in_list_and_report() {
    let dir = setup();
    wallet(&dir)
        .args(["category", "create", "Food"])
        .assert()
        .success();
    wallet(&dir)
        .args([
            "transaction", "expense", "Checking", "12.50", "--title", "Coffee", "--category",
            "Food", "--date", "2025-01-15",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded expense 12.50 USD"));

    wallet(&dir)
        .args(["transaction", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coffee").and(predicate::str::contains("-12.50 USD")));

    wallet(&dir)
        .args(["report", "--type", "expense"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Expense: 12.50 USD (1)")
                .and(predicate::str::contains("2025-01-15")),
        );

    wallet(&dir)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-12.50"));
}

#[test]
fn transfer_to_same_account_is_rejected() {
    let dir = setup();
    wallet(&dir)
        .args(["transaction", "transfer", "Checking", "Checking", "10"])
        .assert()
        .failure();
}

#[test]
fn unknown_account_is_reported() {
    let dir = setup();
    wallet(&dir)
        .args(["account", "show", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Account not found: Nowhere"));
}

#[test]
fn templates_need_a_constraint() {
    let dir = setup();
    wallet(&dir)
        .args(["report", "--save-template", "Everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to save"));

    wallet(&dir)
        .args(["report", "--include", "coffee", "--save-template", "Coffee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved template: Coffee"));

    wallet(&dir)
        .args(["report", "--templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coffee"));

    wallet(&dir)
        .args(["report", "--template", "coffee"])
        .assert()
        .success();
}

#[test]
fn csv_export_round_trips_into_a_fresh_ledger() {
    let dir = setup();
    wallet(&dir)
        .args(["transaction", "income", "Checking", "100", "--title", "Salary"])
        .assert()
        .success();

    let export = dir.path().join("out.csv");
    wallet(&dir)
        .args(["export", "csv"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 transactions"));

    let text = std::fs::read_to_string(&export).unwrap();
    assert!(text.starts_with("Date,Title,Category,Account,Amount"));

    let other = TempDir::new().unwrap();
    wallet(&other)
        .args(["import", "csv"])
        .arg(&export)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Imported:    1")
                .and(predicate::str::contains("New accounts:   Checking")),
        );

    wallet(&other)
        .args(["import", "csv"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicates:  1"));
}

#[test]
fn rates_can_be_set_and_removed() {
    let dir = setup();
    wallet(&dir)
        .args(["rates", "set", "EUR", "0.9"])
        .assert()
        .success();
    wallet(&dir)
        .args(["rates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 USD = 0.9 EUR  (manual)"));
    wallet(&dir)
        .args(["rates", "remove", "EUR"])
        .assert()
        .success();
    wallet(&dir)
        .args(["rates", "remove", "EUR"])
        .assert()
        .failure();
}

#[test]
fn tags_attach_to_transactions() {
    let dir = setup();
    wallet(&dir)
        .args(["tag", "create", "#trip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created tag: #trip"));

    let output = wallet(&dir)
        .args(["transaction", "expense", "Checking", "40", "--tag", "trip"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let id = stdout
        .trim()
        .rsplit('(')
        .next()
        .unwrap()
        .trim_end_matches(')')
        .to_string();

    wallet(&dir)
        .args(["transaction", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tags:"));

    wallet(&dir)
        .args(["tag", "delete", "trip"])
        .assert()
        .success();
    wallet(&dir)
        .args(["tag", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tags found."));
}
