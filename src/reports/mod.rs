//! Reports module for walletbook
//!
//! A report is a filtered view over the transaction history: the
//! [`ReportFilter`] picks transactions, [`calculate_stats`] totals them,
//! [`group_transactions`] lays them out by due state and day, and
//! [`ReportViewModel`] ties it all together. Filters can be saved as
//! [`ReportTemplate`]s.

pub mod filter;
pub mod grouping;
pub mod stats;
pub mod template;
pub mod view_model;

pub use filter::{
    AmountBound, CategoryKey, ClearTarget, IntervalType, KeywordKind, PlannedPaymentType,
    ReportCategory, ReportFilter, ReportFilterEvent, SelectAllTarget, SelectableAccount,
    SelectableCategory, TimePeriod,
};
pub use grouping::{
    group_transactions, DateDivider, DueSection, HistoryItem, IncomeExpensePair,
    TransactionsList,
};
pub use stats::{calculate_stats, ExtendedStats, StatsInput};
pub use template::{FilterSnapshot, ReportTemplate};
pub use view_model::{HeaderUiState, ReportEvent, ReportUiState, ReportViewModel, Source};
