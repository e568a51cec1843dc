//! Report filter state
//!
//! A [`ReportFilter`] is a set of independent constraints. An empty
//! constraint does not restrict anything; a transaction is kept only when it
//! satisfies every populated one. The filter is edited through
//! [`ReportFilterEvent`]s so a front end can drive it as a state machine.

use chrono::{DateTime, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    Account, AccountId, Category, CategoryId, Money, NotBlankTrimmedString, Transaction,
    TransactionType,
};

use super::template::{FilterSnapshot, ReportTemplate};

/// Unit for [`TimePeriod::LastN`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    Day,
    Week,
    Month,
    Year,
}

impl IntervalType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().trim_end_matches('s') {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

/// The time window a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimePeriod {
    /// A calendar month in UTC
    Month { year: i32, month: u32 },
    /// Either end may be open
    Range {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    /// The last `n` intervals up to now
    LastN { n: u32, interval: IntervalType },
    AllTime,
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

impl TimePeriod {
    /// Resolve to a half-open `[from, to)` window; `None` ends are open
    pub fn bounds(&self, now: DateTime<Utc>) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match *self {
            Self::Month { year, month } => {
                let (next_year, next_month) = if month >= 12 {
                    (year + 1, 1)
                } else {
                    (year, month + 1)
                };
                match (month_start(year, month), month_start(next_year, next_month)) {
                    (Some(from), Some(to)) => (Some(from), Some(to)),
                    // An impossible month matches nothing
                    _ => (Some(now), Some(now)),
                }
            }
            Self::Range { from, to } => (from, to),
            Self::LastN { n, interval } => {
                let from = match interval {
                    IntervalType::Day => now.checked_sub_signed(Duration::days(i64::from(n))),
                    IntervalType::Week => now.checked_sub_signed(Duration::weeks(i64::from(n))),
                    IntervalType::Month => now.checked_sub_months(Months::new(n)),
                    IntervalType::Year => now.checked_sub_months(Months::new(n.saturating_mul(12))),
                };
                (from, Some(now))
            }
            Self::AllTime => (None, None),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let (from, to) = self.bounds(now);
        from.map_or(true, |f| at >= f) && to.map_or(true, |t| at < t)
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Self::Range { from, to } => {
                let show = |d: &Option<DateTime<Utc>>| {
                    d.map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "…".to_string())
                };
                write!(f, "{} to {}", show(from), show(to))
            }
            Self::LastN { n, interval } => write!(f, "last {} {:?}(s)", n, interval),
            Self::AllTime => write!(f, "all time"),
        }
    }
}

/// How a due transaction relates to now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedPaymentType {
    /// Due after now
    Upcoming,
    /// Due at or before now and still unsettled
    Overdue,
}

impl PlannedPaymentType {
    /// `None` for settled transactions
    pub fn of(transaction: &Transaction, now: DateTime<Utc>) -> Option<Self> {
        if transaction.settled() {
            None
        } else if transaction.timestamp() > now {
            Some(Self::Upcoming)
        } else {
            Some(Self::Overdue)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBound {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Accounts,
    Categories,
    /// Every constraint
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllTarget {
    Accounts,
    Categories,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectableAccount {
    pub account: Account,
    pub selected: bool,
}

/// Identifies an entry of the category list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
    Category(CategoryId),
    /// Matches transactions without a category
    Uncategorized,
}

impl CategoryKey {
    pub fn of(transaction: &Transaction) -> Self {
        match transaction.category {
            Some(id) => Self::Category(id),
            None => Self::Uncategorized,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportCategory {
    Category(Category),
    Uncategorized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectableCategory {
    pub category: ReportCategory,
    pub selected: bool,
}

impl SelectableCategory {
    pub fn key(&self) -> CategoryKey {
        match &self.category {
            ReportCategory::Category(c) => CategoryKey::Category(c.id),
            ReportCategory::Uncategorized => CategoryKey::Uncategorized,
        }
    }

    pub fn label(&self) -> &str {
        match &self.category {
            ReportCategory::Category(c) => c.name.as_str(),
            ReportCategory::Uncategorized => "Uncategorized",
        }
    }
}

/// Edits a [`ReportFilter`]
#[derive(Debug, Clone, PartialEq)]
pub enum ReportFilterEvent {
    SelectType {
        transaction_type: TransactionType,
        checked: bool,
    },
    SelectPeriod(Option<TimePeriod>),
    ToggleAccount(AccountId),
    ToggleCategory(CategoryKey),
    SetAmount {
        bound: AmountBound,
        amount: Option<Money>,
    },
    Keyword {
        kind: KeywordKind,
        keyword: String,
        add: bool,
    },
    SelectPlanned {
        planned: PlannedPaymentType,
        add: bool,
    },
    TransfersAsIncomeExpense(bool),
    Clear(ClearTarget),
    SelectAll(SelectAllTarget),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub types: Vec<TransactionType>,
    pub period: Option<TimePeriod>,
    pub accounts: Vec<SelectableAccount>,
    pub categories: Vec<SelectableCategory>,
    pub min_amount: Option<Money>,
    pub max_amount: Option<Money>,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub planned: Vec<PlannedPaymentType>,
    pub transfers_as_income_expense: bool,
}

fn add_or_remove<T: PartialEq>(items: &mut Vec<T>, item: T, add: bool) {
    if add {
        if !items.contains(&item) {
            items.push(item);
        }
    } else {
        items.retain(|i| *i != item);
    }
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: ReportFilterEvent) {
        match event {
            ReportFilterEvent::SelectType {
                transaction_type,
                checked,
            } => self.select_type(transaction_type, checked),
            ReportFilterEvent::SelectPeriod(period) => self.select_period(period),
            ReportFilterEvent::ToggleAccount(id) => self.toggle_account(id),
            ReportFilterEvent::ToggleCategory(key) => self.toggle_category(key),
            ReportFilterEvent::SetAmount { bound, amount } => self.set_amount(bound, amount),
            ReportFilterEvent::Keyword { kind, keyword, add } => {
                self.update_keyword(kind, &keyword, add)
            }
            ReportFilterEvent::SelectPlanned { planned, add } => self.select_planned(planned, add),
            ReportFilterEvent::TransfersAsIncomeExpense(on) => {
                self.set_transfers_as_income_expense(on)
            }
            ReportFilterEvent::Clear(target) => self.clear(target),
            ReportFilterEvent::SelectAll(target) => self.select_all(target),
        }
    }

    pub fn select_type(&mut self, transaction_type: TransactionType, checked: bool) {
        add_or_remove(&mut self.types, transaction_type, checked);
    }

    pub fn select_period(&mut self, period: Option<TimePeriod>) {
        self.period = period;
    }

    /// Flip the selection of one account; unknown ids are ignored
    pub fn toggle_account(&mut self, id: AccountId) {
        for entry in self.accounts.iter_mut().filter(|a| a.account.id == id) {
            entry.selected = !entry.selected;
        }
    }

    pub fn toggle_category(&mut self, key: CategoryKey) {
        for entry in self.categories.iter_mut().filter(|c| c.key() == key) {
            entry.selected = !entry.selected;
        }
    }

    pub fn set_amount(&mut self, bound: AmountBound, amount: Option<Money>) {
        match bound {
            AmountBound::Min => self.min_amount = amount,
            AmountBound::Max => self.max_amount = amount,
        }
    }

    /// Adding trims and skips blanks and duplicates; removing matches the
    /// exact trimmed keyword
    pub fn update_keyword(&mut self, kind: KeywordKind, keyword: &str, add: bool) {
        let keyword = keyword.trim();
        if add && keyword.is_empty() {
            return;
        }
        let list = match kind {
            KeywordKind::Include => &mut self.include_keywords,
            KeywordKind::Exclude => &mut self.exclude_keywords,
        };
        add_or_remove(list, keyword.to_string(), add);
    }

    pub fn select_planned(&mut self, planned: PlannedPaymentType, add: bool) {
        add_or_remove(&mut self.planned, planned, add);
    }

    pub fn set_transfers_as_income_expense(&mut self, on: bool) {
        self.transfers_as_income_expense = on;
    }

    pub fn clear(&mut self, target: ClearTarget) {
        match target {
            ClearTarget::Accounts => self.accounts.iter_mut().for_each(|a| a.selected = false),
            ClearTarget::Categories => {
                self.categories.iter_mut().for_each(|c| c.selected = false)
            }
            ClearTarget::Filter => {
                self.types.clear();
                self.period = None;
                self.clear(ClearTarget::Accounts);
                self.clear(ClearTarget::Categories);
                self.min_amount = None;
                self.max_amount = None;
                self.include_keywords.clear();
                self.exclude_keywords.clear();
                self.planned.clear();
                self.transfers_as_income_expense = false;
            }
        }
    }

    pub fn select_all(&mut self, target: SelectAllTarget) {
        match target {
            SelectAllTarget::Accounts => self.accounts.iter_mut().for_each(|a| a.selected = true),
            SelectAllTarget::Categories => {
                self.categories.iter_mut().for_each(|c| c.selected = true)
            }
        }
    }

    /// Replace the account list, keeping flags of accounts seen before
    pub fn sync_accounts(&mut self, accounts: Vec<Account>) {
        let previous = std::mem::take(&mut self.accounts);
        self.accounts = accounts
            .into_iter()
            .map(|account| {
                let selected = previous
                    .iter()
                    .any(|p| p.account.id == account.id && p.selected);
                SelectableAccount { account, selected }
            })
            .collect();
    }

    /// Replace the category list. The uncategorized entry always comes
    /// first and keeps its flag.
    pub fn sync_categories(&mut self, categories: Vec<Category>) {
        let previous = std::mem::take(&mut self.categories);
        let was_selected = |key: CategoryKey| previous.iter().any(|p| p.key() == key && p.selected);

        let mut entries = vec![SelectableCategory {
            category: ReportCategory::Uncategorized,
            selected: was_selected(CategoryKey::Uncategorized),
        }];
        entries.extend(categories.into_iter().map(|c| SelectableCategory {
            selected: was_selected(CategoryKey::Category(c.id)),
            category: ReportCategory::Category(c),
        }));
        self.categories = entries;
    }

    pub fn selected_account_ids(&self) -> Vec<AccountId> {
        self.accounts
            .iter()
            .filter(|a| a.selected)
            .map(|a| a.account.id)
            .collect()
    }

    pub fn selected_category_keys(&self) -> Vec<CategoryKey> {
        self.categories
            .iter()
            .filter(|c| c.selected)
            .map(SelectableCategory::key)
            .collect()
    }

    fn has_constraint(&self) -> bool {
        !self.types.is_empty()
            || self.period.is_some()
            || self.accounts.iter().any(|a| a.selected)
            || self.categories.iter().any(|c| c.selected)
            || self.min_amount.is_some()
            || self.max_amount.is_some()
            || !self.include_keywords.is_empty()
            || !self.exclude_keywords.is_empty()
            || !self.planned.is_empty()
            || self.transfers_as_income_expense
    }

    /// Whether the filter constrains anything and its amount bounds agree.
    /// Only a valid filter can be saved as a template.
    pub fn is_valid(&self) -> bool {
        let bounds_ok = match (self.min_amount, self.max_amount) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        };
        self.has_constraint() && bounds_ok
    }

    pub fn matches(&self, transaction: &Transaction, now: DateTime<Utc>) -> bool {
        if transaction.removed {
            return false;
        }

        if !self.types.is_empty() && !self.types.contains(&transaction.transaction_type()) {
            return false;
        }

        if let Some(period) = &self.period {
            if !period.contains(transaction.timestamp(), now) {
                return false;
            }
        }

        let accounts = self.selected_account_ids();
        if !accounts.is_empty() && !accounts.iter().any(|a| transaction.kind.touches(*a)) {
            return false;
        }

        let categories = self.selected_category_keys();
        if !categories.is_empty() && !categories.contains(&CategoryKey::of(transaction)) {
            return false;
        }

        let amount = transaction.kind.primary_value().money();
        if self.min_amount.is_some_and(|min| amount < min)
            || self.max_amount.is_some_and(|max| amount > max)
        {
            return false;
        }

        if !self.include_keywords.is_empty()
            && !self.include_keywords.iter().any(|k| transaction.mentions(k))
        {
            return false;
        }
        if self.exclude_keywords.iter().any(|k| transaction.mentions(k)) {
            return false;
        }

        match PlannedPaymentType::of(transaction, now) {
            None => true,
            Some(planned) => self.planned.contains(&planned),
        }
    }

    /// Transactions passing every populated constraint, in input order
    pub fn apply(&self, transactions: &[Transaction], now: DateTime<Utc>) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.matches(t, now))
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            types: self.types.clone(),
            period: self.period,
            accounts: self.selected_account_ids(),
            categories: self.selected_category_keys(),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            include_keywords: self.include_keywords.clone(),
            exclude_keywords: self.exclude_keywords.clone(),
            planned: self.planned.clone(),
            transfers_as_income_expense: self.transfers_as_income_expense,
        }
    }

    /// A template of this filter; `None` when the filter is invalid or the
    /// name is blank
    pub fn to_template(&self, name: &str, now: DateTime<Utc>) -> Option<ReportTemplate> {
        if !self.is_valid() {
            return None;
        }
        let name = NotBlankTrimmedString::new(name).ok()?;
        Some(ReportTemplate::new(name, self.snapshot(), now))
    }

    /// Restore constraints from a snapshot. Account and category
    /// selections are matched by id against the current lists.
    pub fn apply_snapshot(&mut self, snapshot: &FilterSnapshot) {
        self.types = snapshot.types.clone();
        self.period = snapshot.period;
        for entry in &mut self.accounts {
            entry.selected = snapshot.accounts.contains(&entry.account.id);
        }
        for entry in &mut self.categories {
            entry.selected = snapshot.categories.contains(&entry.key());
        }
        self.min_amount = snapshot.min_amount;
        self.max_amount = snapshot.max_amount;
        self.include_keywords = snapshot.include_keywords.clone();
        self.exclude_keywords = snapshot.exclude_keywords.clone();
        self.planned = snapshot.planned.clone();
        self.transfers_as_income_expense = snapshot.transfers_as_income_expense;
    }

    pub fn apply_template(&mut self, template: &ReportTemplate) {
        self.apply_snapshot(&template.filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AssetCode, Flow, PositiveAmount, TransactionKind, TransactionTime, Transfer, Value,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn account(name: &str) -> Account {
        Account::new(
            NotBlankTrimmedString::new(name).unwrap(),
            AssetCode::new("USD").unwrap(),
        )
    }

    fn usd(cents: i64) -> Value {
        Value::new(
            PositiveAmount::from_cents(cents).unwrap(),
            AssetCode::new("USD").unwrap(),
        )
    }

    fn expense(account: &Account, cents: i64, time: TransactionTime) -> Transaction {
        Transaction::new(
            TransactionKind::Expense(Flow::new(account.id, usd(cents))),
            time,
        )
    }

    fn filter_with(accounts: &[Account]) -> ReportFilter {
        let mut filter = ReportFilter::new();
        filter.sync_accounts(accounts.to_vec());
        filter
    }

    #[test]
    fn test_toggle_account_twice_restores_flag() {
        let cash = account("Cash");
        let card = account("Card");
        let mut filter = filter_with(&[cash.clone(), card.clone()]);
        filter.toggle_account(card.id);
        let before = filter.clone();

        filter.toggle_account(cash.id);
        assert!(filter.accounts[0].selected);
        assert!(filter.accounts[1].selected);

        filter.toggle_account(cash.id);
        assert_eq!(filter, before);
    }

    #[test]
    fn test_toggle_uncategorized_by_key() {
        let food = Category::new(NotBlankTrimmedString::new("Food").unwrap());
        let mut filter = ReportFilter::new();
        filter.sync_categories(vec![food.clone()]);

        filter.handle(ReportFilterEvent::ToggleCategory(CategoryKey::Uncategorized));
        assert_eq!(filter.selected_category_keys(), vec![CategoryKey::Uncategorized]);

        filter.toggle_category(CategoryKey::Category(food.id));
        filter.toggle_category(CategoryKey::Uncategorized);
        assert_eq!(
            filter.selected_category_keys(),
            vec![CategoryKey::Category(food.id)]
        );
    }

    #[test]
    fn test_keywords_trim_and_dedup() {
        let mut filter = ReportFilter::new();
        filter.update_keyword(KeywordKind::Include, " coffee ", true);
        filter.update_keyword(KeywordKind::Include, "coffee", true);
        filter.update_keyword(KeywordKind::Include, "   ", true);
        assert_eq!(filter.include_keywords, vec!["coffee"]);

        filter.update_keyword(KeywordKind::Include, "coffee  ", false);
        assert!(filter.include_keywords.is_empty());
    }

    #[test]
    fn test_clear_and_select_all() {
        let mut filter = filter_with(&[account("Cash"), account("Card")]);
        filter.sync_categories(vec![]);

        filter.select_all(SelectAllTarget::Accounts);
        filter.select_all(SelectAllTarget::Categories);
        assert!(filter.accounts.iter().all(|a| a.selected));
        assert!(filter.categories.iter().all(|c| c.selected));

        filter.select_type(TransactionType::Income, true);
        filter.update_keyword(KeywordKind::Exclude, "rent", true);
        filter.clear(ClearTarget::Filter);
        assert!(!filter.is_valid());
        assert!(filter.accounts.iter().all(|a| !a.selected));
    }

    #[test]
    fn test_sync_keeps_existing_flags() {
        let cash = account("Cash");
        let mut filter = filter_with(&[cash.clone()]);
        filter.toggle_account(cash.id);

        let card = account("Card");
        filter.sync_accounts(vec![cash.clone(), card.clone()]);
        assert_eq!(filter.selected_account_ids(), vec![cash.id]);
    }

    #[test]
    fn test_validity() {
        let mut filter = ReportFilter::new();
        assert!(!filter.is_valid());

        filter.set_amount(AmountBound::Min, Some(Money::from_cents(500)));
        assert!(filter.is_valid());

        filter.set_amount(AmountBound::Max, Some(Money::from_cents(100)));
        assert!(!filter.is_valid());
    }

    #[test]
    fn test_template_requires_valid_filter_and_name() {
        let mut filter = ReportFilter::new();
        assert!(filter.to_template("Monthly food", now()).is_none());

        filter.select_type(TransactionType::Expense, true);
        assert!(filter.to_template("  ", now()).is_none());

        let template = filter.to_template("Monthly food", now()).unwrap();
        assert_eq!(template.name, "Monthly food");
        assert_eq!(template.filter.types, vec![TransactionType::Expense]);
    }

    #[test]
    fn test_apply_template_restores_selection_by_id() {
        let cash = account("Cash");
        let card = account("Card");
        let mut filter = filter_with(&[cash.clone(), card.clone()]);
        filter.toggle_account(card.id);
        filter.update_keyword(KeywordKind::Include, "fuel", true);
        let template = filter.to_template("Fuel", now()).unwrap();

        let mut fresh = filter_with(&[cash, card.clone()]);
        fresh.apply_template(&template);
        assert_eq!(fresh.selected_account_ids(), vec![card.id]);
        assert_eq!(fresh.include_keywords, vec!["fuel"]);
    }

    #[test]
    fn test_apply_filters_by_account_amount_and_keywords() {
        let cash = account("Cash");
        let card = account("Card");
        let at = TransactionTime::Actual(now() - Duration::days(1));
        let coffee = expense(&cash, 450, at)
            .with_title(NotBlankTrimmedString::optional(Some("Coffee")));
        let rent = expense(&card, 90000, at).with_title(NotBlankTrimmedString::optional(Some("Rent")));
        let removed = expense(&cash, 100, at).mark_removed();
        let all = vec![coffee.clone(), rent.clone(), removed];

        let mut filter = filter_with(&[cash.clone(), card.clone()]);
        assert_eq!(filter.apply(&all, now()).len(), 2);

        filter.toggle_account(cash.id);
        assert_eq!(filter.apply(&all, now()), vec![coffee.clone()]);

        filter.clear(ClearTarget::Accounts);
        filter.set_amount(AmountBound::Min, Some(Money::from_cents(1000)));
        assert_eq!(filter.apply(&all, now()), vec![rent]);

        filter.set_amount(AmountBound::Min, None);
        filter.update_keyword(KeywordKind::Exclude, "RENT", true);
        assert_eq!(filter.apply(&all, now()), vec![coffee]);
    }

    #[test]
    fn test_transfer_matches_either_account() {
        let cash = account("Cash");
        let card = account("Card");
        let transfer = Transaction::new(
            TransactionKind::Transfer(Transfer::new(cash.id, usd(100), card.id, usd(100)).unwrap()),
            TransactionTime::Actual(now()),
        );
        let mut filter = filter_with(&[cash, card.clone()]);
        filter.toggle_account(card.id);

        assert!(filter.matches(&transfer, now()));
    }

    #[test]
    fn test_planned_payments_need_selection() {
        let cash = account("Cash");
        let upcoming = expense(&cash, 100, TransactionTime::Due(now() + Duration::days(3)));
        let overdue = expense(&cash, 100, TransactionTime::Due(now() - Duration::days(3)));
        let all = vec![upcoming.clone(), overdue.clone()];

        let mut filter = ReportFilter::new();
        assert!(filter.apply(&all, now()).is_empty());

        filter.select_planned(PlannedPaymentType::Overdue, true);
        assert_eq!(filter.apply(&all, now()), vec![overdue]);

        filter.select_planned(PlannedPaymentType::Overdue, false);
        filter.select_planned(PlannedPaymentType::Upcoming, true);
        assert_eq!(filter.apply(&all, now()), vec![upcoming]);
    }

    #[test]
    fn test_period_bounds() {
        let june = TimePeriod::Month {
            year: 2025,
            month: 6,
        };
        let (from, to) = june.bounds(now());
        assert_eq!(from, Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()));
        assert_eq!(to, Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()));

        let december = TimePeriod::Month {
            year: 2024,
            month: 12,
        };
        assert!(december.contains(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap(), now()));

        let last_week = TimePeriod::LastN {
            n: 1,
            interval: IntervalType::Week,
        };
        assert!(last_week.contains(now() - Duration::days(6), now()));
        assert!(!last_week.contains(now() - Duration::days(8), now()));
        assert!(TimePeriod::AllTime.contains(now() + Duration::days(900), now()));
    }
}
