//! Report screen state
//!
//! [`ReportViewModel`] combines its inputs (base currency, accounts,
//! categories, transactions, exchange rates, templates and the clock) with
//! the filter and UI flags into one [`ReportUiState`]. Inputs start out
//! [`Source::Pending`]; every input change or event recomputes the state
//! synchronously.

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::error::WalletResult;
use crate::export::export_transactions_csv;
use crate::models::{Account, AccountId, AssetCode, Category, Money, Transaction};
use crate::rates::ExchangeRates;
use crate::storage::{Storage, TemplateStore};

use super::filter::{ReportFilter, ReportFilterEvent};
use super::grouping::{group_transactions, TransactionsList};
use super::stats::{calculate_stats, ExtendedStats, StatsInput};
use super::template::ReportTemplate;

/// An input that may not have produced a value yet
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Source<T> {
    #[default]
    Pending,
    Ready(T),
}

impl<T> Source<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending => None,
        }
    }
}

impl<T: Clone + Default> Source<T> {
    /// The value, or the empty default while pending
    pub fn value_or_default(&self) -> T {
        self.as_ready().cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    FilterOptions(bool),
    Template(bool),
    TemplateName(String),
    SaveTemplate(bool),
    Filter(ReportFilterEvent),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderUiState {
    pub balance: Money,
    pub income: Money,
    pub expense: Money,
    pub incomes_count: usize,
    pub expenses_count: usize,
    pub transfers_count: usize,
    pub account_filters: Vec<AccountId>,
    pub transfers_as_income_expense: bool,
}

impl HeaderUiState {
    fn new(stats: ExtendedStats, filter: &ReportFilter) -> Self {
        Self {
            balance: stats.balance,
            income: stats.income,
            expense: stats.expense,
            incomes_count: stats.incomes_count,
            expenses_count: stats.expenses_count,
            transfers_count: stats.transfers_count,
            account_filters: filter.selected_account_ids(),
            transfers_as_income_expense: filter.transfers_as_income_expense,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportUiState {
    pub base_currency: Option<AssetCode>,
    pub loading: bool,
    pub transactions: Vec<Transaction>,
    pub header: HeaderUiState,
    pub list: TransactionsList,
    pub filter: ReportFilter,
    pub show_save_template_option: bool,
    pub selected_template: Option<ReportTemplate>,
    pub templates: Vec<ReportTemplate>,
    pub filter_visible: bool,
    pub template_visible: bool,
    pub template_save_visible: bool,
}

pub struct ReportViewModel {
    base_currency: Source<AssetCode>,
    accounts: Source<Vec<Account>>,
    categories: Source<Vec<Category>>,
    transactions: Source<Vec<Transaction>>,
    rates: Source<ExchangeRates>,
    templates: Source<Vec<ReportTemplate>>,
    now: DateTime<Utc>,

    filter: ReportFilter,
    loading: bool,
    filter_visible: bool,
    template_visible: bool,
    template_save_visible: bool,
    template_name: String,

    state: ReportUiState,
}

impl ReportViewModel {
    pub fn new(now: DateTime<Utc>) -> Self {
        let mut vm = Self {
            base_currency: Source::Pending,
            accounts: Source::Pending,
            categories: Source::Pending,
            transactions: Source::Pending,
            rates: Source::Pending,
            templates: Source::Pending,
            now,
            filter: ReportFilter::new(),
            loading: false,
            filter_visible: false,
            template_visible: false,
            template_save_visible: false,
            template_name: String::new(),
            state: ReportUiState::default(),
        };
        vm.filter.sync_categories(Vec::new());
        vm.recompute();
        vm
    }

    /// Feed every input from `storage` in one go
    pub fn load(&mut self, storage: &Storage) -> WalletResult<()> {
        self.base_currency = Source::Ready(storage.base_currency().clone());
        let accounts = storage.accounts.find_all(false)?;
        self.filter.sync_accounts(accounts.clone());
        self.accounts = Source::Ready(accounts);
        let categories = storage.categories.find_all(false)?;
        self.filter.sync_categories(categories.clone());
        self.categories = Source::Ready(categories);
        self.transactions = Source::Ready(storage.transactions.find_all(false)?);
        self.rates = Source::Ready(storage.exchange_rates()?);
        self.templates = Source::Ready(storage.templates.list()?);
        self.recompute();
        Ok(())
    }

    pub fn set_base_currency(&mut self, base: AssetCode) {
        self.base_currency = Source::Ready(base);
        self.recompute();
    }

    pub fn set_accounts(&mut self, accounts: Vec<Account>) {
        self.filter.sync_accounts(accounts.clone());
        self.accounts = Source::Ready(accounts);
        self.recompute();
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.filter.sync_categories(categories.clone());
        self.categories = Source::Ready(categories);
        self.recompute();
    }

    pub fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = Source::Ready(transactions);
        self.recompute();
    }

    pub fn set_rates(&mut self, rates: ExchangeRates) {
        self.rates = Source::Ready(rates);
        self.recompute();
    }

    pub fn set_templates(&mut self, templates: Vec<ReportTemplate>) {
        self.templates = Source::Ready(templates);
        self.recompute();
    }

    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.now = now;
        self.recompute();
    }

    pub fn state(&self) -> &ReportUiState {
        &self.state
    }

    pub fn filter(&self) -> &ReportFilter {
        &self.filter
    }

    pub fn on_event(&mut self, event: ReportEvent) {
        match event {
            ReportEvent::FilterOptions(visible) => self.filter_visible = visible,
            ReportEvent::Template(visible) => self.template_visible = visible,
            ReportEvent::TemplateName(name) => self.template_name = name,
            ReportEvent::SaveTemplate(visible) => self.template_save_visible = visible,
            ReportEvent::Filter(event) => self.filter.handle(event),
        }
        self.recompute();
    }

    pub fn apply_template(&mut self, template: &ReportTemplate) {
        self.filter.apply_template(template);
        self.template_visible = false;
        self.recompute();
    }

    /// Persist the selected template and refresh the template list.
    /// Returns `None` when there is nothing to save.
    pub fn save_template(&mut self, store: &TemplateStore) -> WalletResult<Option<ReportTemplate>> {
        let Some(template) = self.state.selected_template.clone() else {
            return Ok(None);
        };
        let saved = store.save(template)?;
        self.templates = Source::Ready(store.list()?);
        self.template_save_visible = false;
        self.template_name.clear();
        self.recompute();
        Ok(Some(saved))
    }

    /// Write the filtered transactions as CSV. Returns `false` without
    /// writing anything when there is nothing to export.
    pub fn export_csv<W: Write>(&mut self, writer: W) -> WalletResult<bool> {
        if self.state.transactions.is_empty() {
            return Ok(false);
        }

        self.loading = true;
        self.recompute();

        let accounts = self.accounts.value_or_default();
        let categories = self.categories.value_or_default();
        let result = export_transactions_csv(writer, &self.state.transactions, &accounts, &categories);

        self.loading = false;
        self.recompute();
        result.map(|()| true)
    }

    fn recompute(&mut self) {
        let now = self.now;
        let transactions = self
            .transactions
            .as_ready()
            .map(|all| self.filter.apply(all, now))
            .unwrap_or_default();

        let base = self.base_currency.as_ready().cloned();
        let (stats, list) = match &base {
            Some(base) => {
                let fallback;
                let rates = match self.rates.as_ready() {
                    Some(rates) => rates,
                    None => {
                        fallback = ExchangeRates::new(base.clone());
                        &fallback
                    }
                };
                let accounts = self.filter.selected_account_ids();
                let stats = calculate_stats(&StatsInput {
                    transactions: &transactions,
                    output_currency: base,
                    rates,
                    accounts: &accounts,
                    transfers_as_income_expense: self.filter.transfers_as_income_expense,
                });
                (stats, group_transactions(&transactions, base, rates, now))
            }
            None => (ExtendedStats::default(), TransactionsList::default()),
        };

        self.state = ReportUiState {
            base_currency: base,
            loading: self.loading,
            header: HeaderUiState::new(stats, &self.filter),
            list,
            transactions,
            show_save_template_option: self.filter.is_valid(),
            selected_template: self.filter.to_template(&self.template_name, now),
            templates: self.templates.value_or_default(),
            filter: self.filter.clone(),
            filter_visible: self.filter_visible,
            template_visible: self.template_visible,
            template_save_visible: self.template_save_visible,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Flow, NotBlankTrimmedString, PositiveAmount, TransactionKind, TransactionTime,
        TransactionType, Value,
    };
    use crate::reports::filter::{KeywordKind, SelectAllTarget};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 10, 0, 0).unwrap()
    }

    fn usd() -> AssetCode {
        AssetCode::new("USD").unwrap()
    }

    fn cash() -> Account {
        Account::new(NotBlankTrimmedString::new("Cash").unwrap(), usd())
    }

    fn expense(account: &Account, cents: i64, title: &str) -> Transaction {
        Transaction::new(
            TransactionKind::Expense(Flow::new(
                account.id,
                Value::new(PositiveAmount::from_cents(cents).unwrap(), usd()),
            )),
            TransactionTime::Actual(now() - Duration::hours(2)),
        )
        .with_title(NotBlankTrimmedString::optional(Some(title)))
    }

    fn ready_vm(account: &Account, transactions: Vec<Transaction>) -> ReportViewModel {
        let mut vm = ReportViewModel::new(now());
        vm.set_base_currency(usd());
        vm.set_accounts(vec![account.clone()]);
        vm.set_categories(vec![]);
        vm.set_rates(ExchangeRates::new(usd()));
        vm.set_transactions(transactions);
        vm
    }

    #[test]
    fn test_pending_inputs_give_empty_state() {
        let vm = ReportViewModel::new(now());
        let state = vm.state();
        assert!(state.base_currency.is_none());
        assert!(state.transactions.is_empty());
        assert!(state.list.is_empty());
        assert_eq!(state.header, HeaderUiState::default());
        assert!(!state.show_save_template_option);
    }

    #[test]
    fn test_state_follows_inputs_and_filter() {
        let account = cash();
        let mut vm = ready_vm(
            &account,
            vec![expense(&account, 1200, "Lunch"), expense(&account, 800, "Coffee")],
        );
        assert_eq!(vm.state().transactions.len(), 2);
        assert_eq!(vm.state().header.expense, Money::from_cents(2000));

        vm.on_event(ReportEvent::Filter(ReportFilterEvent::Keyword {
            kind: KeywordKind::Include,
            keyword: "coffee".into(),
            add: true,
        }));
        assert_eq!(vm.state().transactions.len(), 1);
        assert_eq!(vm.state().header.expense, Money::from_cents(800));
        assert!(vm.state().show_save_template_option);
    }

    #[test]
    fn test_selected_template_needs_name_and_valid_filter() {
        let account = cash();
        let mut vm = ready_vm(&account, vec![]);

        vm.on_event(ReportEvent::TemplateName("Everything".into()));
        assert!(vm.state().selected_template.is_none());

        vm.on_event(ReportEvent::Filter(ReportFilterEvent::SelectAll(
            SelectAllTarget::Accounts,
        )));
        let template = vm.state().selected_template.clone().unwrap();
        assert_eq!(template.name, "Everything");
        assert_eq!(template.filter.accounts, vec![account.id]);
    }

    #[test]
    fn test_save_template_refreshes_list() {
        let storage = Storage::in_memory(usd());
        let account = cash();
        let mut vm = ready_vm(&account, vec![]);
        vm.on_event(ReportEvent::SaveTemplate(true));
        vm.on_event(ReportEvent::TemplateName("Expenses".into()));
        vm.on_event(ReportEvent::Filter(ReportFilterEvent::SelectType {
            transaction_type: TransactionType::Expense,
            checked: true,
        }));

        let saved = vm.save_template(&storage.templates).unwrap().unwrap();
        assert_eq!(vm.state().templates, vec![saved]);
        assert!(!vm.state().template_save_visible);
        assert!(vm.state().selected_template.is_none());
    }

    #[test]
    fn test_visibility_flags() {
        let mut vm = ReportViewModel::new(now());
        vm.on_event(ReportEvent::FilterOptions(true));
        vm.on_event(ReportEvent::Template(true));
        assert!(vm.state().filter_visible);
        assert!(vm.state().template_visible);

        vm.on_event(ReportEvent::FilterOptions(false));
        assert!(!vm.state().filter_visible);
    }

    #[test]
    fn test_export_csv() {
        let account = cash();
        let mut empty = ready_vm(&account, vec![]);
        let mut out = Vec::new();
        assert!(!empty.export_csv(&mut out).unwrap());
        assert!(out.is_empty());

        let mut vm = ready_vm(&account, vec![expense(&account, 450, "Coffee")]);
        let mut out = Vec::new();
        assert!(vm.export_csv(&mut out).unwrap());
        assert!(!vm.state().loading);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Coffee"));
        assert!(text.contains("Cash"));
    }
}
