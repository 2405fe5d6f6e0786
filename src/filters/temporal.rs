//! Relative date resolution for temporal filters.
//!
//! Expressions are resolved against "today" as reported by a [`Clock`], so
//! callers (and tests) can pin the reference date.
//!
//! | Expression   | Resolves to                          |
//! |--------------|--------------------------------------|
//! | `today`      | `[today]`                            |
//! | `yesterday`  | `[today - 1d]`                       |
//! | `last week`  | `[today - 7d, today]`                |
//! | `last month` | `[today - 30d, today]`               |
//! | `this year`  | `[Jan 1, today]`                     |
//! | `last year`  | `[Jan 1, Dec 31]` of the prior year  |
//! | anything else| `[today - 30d, today]` with a warning|

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};

use super::{FilterSpec, Operator};
use crate::metadata::TableMetadata;
use crate::query::{QueryValue, TemporalFilter};
use crate::resolver::find_date_column;

/// Output format for resolved dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `filter_name` given to temporal filters.
pub const DATE_RANGE_FILTER: &str = "date_range";

/// Window used for unrecognized expressions and for `last month`.
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Source of the current date.
pub trait Clock: Send + Sync + fmt::Debug {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A pinned date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Recognized relative expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDate {
    Today,
    Yesterday,
    LastWeek,
    LastMonth,
    ThisYear,
    LastYear,
}

impl RelativeDate {
    /// Case-insensitive parse; surrounding whitespace is ignored.
    pub fn parse(expression: &str) -> Option<Self> {
        match expression.trim().to_lowercase().as_str() {
            "today" => Some(Self::Today),
            "yesterday" => Some(Self::Yesterday),
            "last week" => Some(Self::LastWeek),
            "last month" => Some(Self::LastMonth),
            "this year" => Some(Self::ThisYear),
            "last year" => Some(Self::LastYear),
            _ => None,
        }
    }

    /// Concrete dates relative to `today`. Months are 30 days.
    pub fn resolve(&self, today: NaiveDate) -> Vec<NaiveDate> {
        match self {
            Self::Today => vec![today],
            Self::Yesterday => vec![days_before(today, 1)],
            Self::LastWeek => vec![days_before(today, 7), today],
            Self::LastMonth => vec![days_before(today, DEFAULT_WINDOW_DAYS), today],
            Self::ThisYear => vec![ymd(today.year(), 1, 1, today), today],
            Self::LastYear => {
                let year = today.year() - 1;
                vec![ymd(year, 1, 1, today), ymd(year, 12, 31, today)]
            }
        }
    }
}

/// Turns temporal filters into filter specs on a table's date column.
#[derive(Debug, Clone)]
pub struct TemporalResolver {
    clock: Arc<dyn Clock>,
    default_window_days: u64,
}

impl Default for TemporalResolver {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl TemporalResolver {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            default_window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// Replace the clock, keeping the window.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Window for unrecognized expressions.
    pub fn with_default_window(mut self, days: u64) -> Self {
        self.default_window_days = days;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Resolve a relative expression to ISO dates, never failing.
    pub fn resolve_expression(&self, expression: &str) -> Vec<String> {
        let today = self.today();
        let dates = match RelativeDate::parse(expression) {
            Some(relative) => relative.resolve(today),
            None => {
                tracing::warn!(
                    expression,
                    days = self.default_window_days,
                    "could not precisely resolve temporal expression, using default window"
                );
                vec![days_before(today, self.default_window_days), today]
            }
        };
        dates.iter().map(format_date).collect()
    }

    /// Explicit bounds when present, otherwise the resolved expression.
    pub fn resolve_dates(&self, filter: &TemporalFilter) -> Vec<String> {
        if !filter.value.is_empty() {
            return filter.value.clone();
        }
        match filter.expression() {
            Some(expression) => self.resolve_expression(expression),
            None => Vec::new(),
        }
    }

    /// Build the temporal filter against `date_column`.
    ///
    /// Two dates give `BETWEEN`, one gives `=`; any other shape falls back
    /// to `>` with the values passed through.
    pub fn build_filter(&self, filter: &TemporalFilter, date_column: &str) -> FilterSpec {
        let dates = self.resolve_dates(filter);

        let (operator, value) = match dates.len() {
            2 => (Operator::Between, QueryValue::text_list(dates)),
            1 => (
                Operator::Eq,
                QueryValue::Text(dates.into_iter().next().unwrap_or_default()),
            ),
            _ => (Operator::Gt, QueryValue::text_list(dates)),
        };

        FilterSpec::new(DATE_RANGE_FILTER, date_column, operator, value)
    }

    /// Build the temporal filter for a table, or `None` when the table has
    /// no date-bearing column.
    pub fn resolve_temporal(
        &self,
        filter: &TemporalFilter,
        table: &TableMetadata,
    ) -> Option<FilterSpec> {
        let Some(column) = find_date_column(table) else {
            tracing::warn!(
                table = %table.name,
                "no date column found for temporal filtering"
            );
            return None;
        };
        Some(self.build_filter(filter, &column.name))
    }
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

fn ymd(year: i32, month: u32, day: u32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(fallback)
}
