//! Search directives: sort, single-column filter and paging.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::error::TrackerError;
use crate::domain::investment::{Investment, InvestmentStatus, InvestmentType};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "u8")]
pub enum SortOrder {
    #[default]
    Ascending = 0,
    Descending = 1,
}

impl From<SortOrder> for u8 {
    fn from(value: SortOrder) -> Self {
        value as u8
    }
}

/// Accepts `0`/`1` or the names `"Ascending"`/`"Descending"` (any case, `asc`/`desc` too).
impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Ordinal(u8),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Ordinal(0) => Ok(SortOrder::Ascending),
            Raw::Ordinal(1) => Ok(SortOrder::Descending),
            Raw::Ordinal(n) => Err(serde::de::Error::custom(format!(
                "unknown sort order {n}"
            ))),
            Raw::Name(name) => match name.to_ascii_lowercase().as_str() {
                "ascending" | "asc" => Ok(SortOrder::Ascending),
                "descending" | "desc" => Ok(SortOrder::Descending),
                _ => Err(serde::de::Error::custom(format!(
                    "unknown sort order '{name}'"
                ))),
            },
        }
    }
}

/// Columns a search can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Amount,
    Type,
    PurchasedDate,
    Status,
}

impl SortField {
    /// Unrecognized names yield `None`, meaning "leave store order".
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "amount" => Some(SortField::Amount),
            "type" | "investmenttype" => Some(SortField::Type),
            "purchaseddate" => Some(SortField::PurchasedDate),
            "status" => Some(SortField::Status),
            _ => None,
        }
    }

    pub fn compare(self, a: &Investment, b: &Investment) -> Ordering {
        match self {
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Type => a.investment_type.cmp(&b.investment_type),
            SortField::PurchasedDate => a.purchased_date.cmp(&b.purchased_date),
            SortField::Status => a.status.cmp(&b.status),
        }
    }
}

/// A typed single-column predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    DescriptionContains(String),
    AmountEquals(Decimal),
    TypeEquals(InvestmentType),
    PurchasedOn(NaiveDate),
    StatusEquals(InvestmentStatus),
}

impl ColumnFilter {
    /// Builds the predicate for `column`, or `None` when the column is unknown
    /// or the value does not parse for it. Neither case is an error.
    pub fn parse(column: &str, value: &str) -> Option<Self> {
        match column.trim().to_ascii_lowercase().as_str() {
            "description" => Some(ColumnFilter::DescriptionContains(value.to_string())),
            "amount" => Decimal::from_str(value.trim())
                .ok()
                .map(ColumnFilter::AmountEquals),
            "investmenttype" | "type" => value.parse().ok().map(ColumnFilter::TypeEquals),
            "purchaseddate" => parse_date(value).map(ColumnFilter::PurchasedOn),
            "status" => value.parse().ok().map(ColumnFilter::StatusEquals),
            _ => None,
        }
    }

    pub fn matches(&self, investment: &Investment) -> bool {
        match self {
            ColumnFilter::DescriptionContains(needle) => investment
                .description
                .as_deref()
                .is_some_and(|d| d.contains(needle.as_str())),
            ColumnFilter::AmountEquals(amount) => investment.amount == *amount,
            ColumnFilter::TypeEquals(kind) => investment.investment_type == *kind,
            ColumnFilter::PurchasedOn(day) => investment.purchased_date == *day,
            ColumnFilter::StatusEquals(status) => investment.status == *status,
        }
    }
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp, keeping the date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// The bundle of sort/filter/page directives accepted by search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParameter {
    pub sort_field: String,
    pub sort_order: SortOrder,
    pub filter_column: Option<String>,
    #[serde(deserialize_with = "filter_value_as_string")]
    pub filter_value: Option<String>,
    pub page_number: i64,
    pub page_size: i64,
}

impl Default for FilterParameter {
    fn default() -> Self {
        Self {
            sort_field: String::new(),
            sort_order: SortOrder::Ascending,
            filter_column: None,
            filter_value: None,
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterParameter {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.page_number < 1 {
            return Err(TrackerError::InvalidPage {
                reason: format!("pageNumber must be at least 1, got {}", self.page_number),
            });
        }
        if self.page_size <= 0 {
            return Err(TrackerError::InvalidPage {
                reason: format!("pageSize must be positive, got {}", self.page_size),
            });
        }
        Ok(())
    }

    pub fn sort(&self) -> Option<SortField> {
        SortField::parse(&self.sort_field)
    }

    /// The column predicate, when both column and value are present and usable.
    pub fn column_filter(&self) -> Option<ColumnFilter> {
        match (&self.filter_column, &self.filter_value) {
            (Some(column), Some(value)) => ColumnFilter::parse(column, value),
            _ => None,
        }
    }
}

// The filter value may arrive as any JSON scalar.
fn filter_value_as_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
