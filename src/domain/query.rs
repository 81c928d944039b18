//! Filtered, sorted, paginated search over investment records.
//!
//! Stages run in a fixed order because paging truncates: date range, column
//! filter, sort, skip, take.

use chrono::NaiveDate;

use crate::domain::filter::{FilterParameter, SortOrder};
use crate::domain::investment::Investment;

/// Inclusive bounds on `purchased_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Missing bounds default to the earliest representable date and `today`.
    pub fn resolve(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            from: from.unwrap_or(NaiveDate::MIN),
            to: to.unwrap_or(today),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Returns one page of `investments` matching `range` and `params`.
///
/// Input order is kept when no sort field is recognized, and among equal
/// sort keys. Paging values are expected to have passed
/// [`FilterParameter::validate`]; out-of-range values yield an empty page.
pub fn search(
    investments: &[Investment],
    range: DateRange,
    params: &FilterParameter,
) -> Vec<Investment> {
    let column = params.column_filter();
    if params.filter_column.is_some() && column.is_none() {
        tracing::debug!(
            column = params.filter_column.as_deref().unwrap_or_default(),
            value = params.filter_value.as_deref().unwrap_or_default(),
            "column filter not applied"
        );
    }

    let mut matched: Vec<&Investment> = investments
        .iter()
        .filter(|i| range.contains(i.purchased_date))
        .filter(|i| column.as_ref().is_none_or(|f| f.matches(i)))
        .collect();

    if let Some(field) = params.sort() {
        match params.sort_order {
            SortOrder::Ascending => matched.sort_by(|a, b| field.compare(a, b)),
            SortOrder::Descending => matched.sort_by(|a, b| field.compare(b, a)),
        }
    }

    let (skip, take) = page_window(params.page_number, params.page_size);
    matched.into_iter().skip(skip).take(take).cloned().collect()
}

fn page_window(page_number: i64, page_size: i64) -> (usize, usize) {
    if page_number < 1 || page_size <= 0 {
        return (0, 0);
    }
    let size = usize::try_from(page_size).unwrap_or(usize::MAX);
    let skip = usize::try_from(page_number - 1)
        .unwrap_or(usize::MAX)
        .saturating_mul(size);
    (skip, size)
}
