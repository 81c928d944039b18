//! Investment record, its closed enums, and the holding-duration projection.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::TrackerError;

/// Failure to read an enum from a name or an ordinal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Category of an investment. The discriminant is the wire ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum InvestmentType {
    Fd = 0,
    Ppf = 1,
    MutualFunds = 2,
    Stocks = 3,
    Sgb = 4,
    Etf = 5,
    CorporateBond = 6,
    Reit = 7,
    Crypto = 8,
    Ipo = 9,
}

impl InvestmentType {
    pub const ALL: [InvestmentType; 10] = [
        InvestmentType::Fd,
        InvestmentType::Ppf,
        InvestmentType::MutualFunds,
        InvestmentType::Stocks,
        InvestmentType::Sgb,
        InvestmentType::Etf,
        InvestmentType::CorporateBond,
        InvestmentType::Reit,
        InvestmentType::Crypto,
        InvestmentType::Ipo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InvestmentType::Fd => "FD",
            InvestmentType::Ppf => "PPF",
            InvestmentType::MutualFunds => "MutualFunds",
            InvestmentType::Stocks => "Stocks",
            InvestmentType::Sgb => "SGB",
            InvestmentType::Etf => "ETF",
            InvestmentType::CorporateBond => "CorporateBond",
            InvestmentType::Reit => "REIT",
            InvestmentType::Crypto => "Crypto",
            InvestmentType::Ipo => "IPO",
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the name in any case, or the ordinal as a decimal string.
impl FromStr for InvestmentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_enum(s, &Self::ALL, |t| t.name(), Self::from_ordinal).ok_or_else(|| {
            ParseEnumError {
                kind: "investment type",
                value: s.to_string(),
            }
        })
    }
}

impl From<InvestmentType> for u8 {
    fn from(value: InvestmentType) -> Self {
        value.ordinal()
    }
}

impl TryFrom<u8> for InvestmentType {
    type Error = ParseEnumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(value).ok_or(ParseEnumError {
            kind: "investment type",
            value: value.to_string(),
        })
    }
}

/// Caller-set lifecycle label. No transitions are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum InvestmentStatus {
    Active = 0,
    Sold = 1,
    Matured = 2,
}

impl InvestmentStatus {
    pub const ALL: [InvestmentStatus; 3] = [
        InvestmentStatus::Active,
        InvestmentStatus::Sold,
        InvestmentStatus::Matured,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InvestmentStatus::Active => "Active",
            InvestmentStatus::Sold => "Sold",
            InvestmentStatus::Matured => "Matured",
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InvestmentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_enum(s, &Self::ALL, |t| t.name(), Self::from_ordinal).ok_or_else(|| {
            ParseEnumError {
                kind: "investment status",
                value: s.to_string(),
            }
        })
    }
}

impl From<InvestmentStatus> for u8 {
    fn from(value: InvestmentStatus) -> Self {
        value.ordinal()
    }
}

impl TryFrom<u8> for InvestmentStatus {
    type Error = ParseEnumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(value).ok_or(ParseEnumError {
            kind: "investment status",
            value: value.to_string(),
        })
    }
}

fn parse_enum<T: Copy>(
    input: &str,
    all: &[T],
    name: impl Fn(T) -> &'static str,
    from_ordinal: impl Fn(u8) -> Option<T>,
) -> Option<T> {
    let trimmed = input.trim();
    if let Some(found) = all
        .iter()
        .copied()
        .find(|v| name(*v).eq_ignore_ascii_case(trimmed))
    {
        return Some(found);
    }
    trimmed.parse::<u8>().ok().and_then(from_ordinal)
}

/// Whole days held: from purchase to sale, or to `today` while still held.
///
/// Never negative. A sell date before the purchase date yields zero.
pub fn holding_days(purchased: NaiveDate, sold: Option<NaiveDate>, today: NaiveDate) -> i64 {
    let end = sold.unwrap_or(today);
    (end - purchased).num_days().max(0)
}

/// Client-supplied fields of an investment.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentDraft {
    pub amount: Decimal,
    pub investment_type: InvestmentType,
    pub purchased_date: NaiveDate,
    pub sell_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: InvestmentStatus,
}

/// Earliest date a record may carry: 0001-01-01.
pub fn earliest_storable_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Latest date a record may carry: 9999-12-31.
pub fn latest_storable_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Clamps a query range to the storable dates, so stores never see
/// bounds their date types cannot represent.
pub fn storable_bounds(from: NaiveDate, to: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (floor, ceiling) = (earliest_storable_date(), latest_storable_date());
    (from.clamp(floor, ceiling), to.clamp(floor, ceiling))
}

impl InvestmentDraft {
    pub fn validate(&self) -> Result<(), TrackerError> {
        let storable = earliest_storable_date()..=latest_storable_date();
        for (field, value) in [
            ("purchased date", Some(self.purchased_date)),
            ("sell date", self.sell_date),
        ] {
            if let Some(day) = value.filter(|d| !storable.contains(d)) {
                return Err(TrackerError::InvalidRecord {
                    reason: format!("{field} {day} is outside 0001-01-01..=9999-12-31"),
                });
            }
        }
        if let Some(sold) = self.sell_date {
            if sold < self.purchased_date {
                return Err(TrackerError::InvalidRecord {
                    reason: format!(
                        "sell date {} is before purchased date {}",
                        sold, self.purchased_date
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A persisted investment row.
#[derive(Debug, Clone, PartialEq)]
pub struct Investment {
    pub id: i64,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    pub amount: Decimal,
    pub investment_type: InvestmentType,
    pub purchased_date: NaiveDate,
    pub sell_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: InvestmentStatus,
}

impl Investment {
    pub fn holding_days(&self, today: NaiveDate) -> i64 {
        holding_days(self.purchased_date, self.sell_date, today)
    }

    pub fn draft(&self) -> InvestmentDraft {
        InvestmentDraft {
            amount: self.amount,
            investment_type: self.investment_type,
            purchased_date: self.purchased_date,
            sell_date: self.sell_date,
            description: self.description.clone(),
            status: self.status,
        }
    }

    /// Replaces every client field with `draft` and stamps `modified_on`.
    ///
    /// `modified_on` never moves before `created_on`.
    pub fn replaced_with(&self, draft: InvestmentDraft, now: DateTime<Utc>) -> Investment {
        Investment {
            id: self.id,
            created_on: self.created_on,
            modified_on: now.max(self.created_on),
            amount: draft.amount,
            investment_type: draft.investment_type,
            purchased_date: draft.purchased_date,
            sell_date: draft.sell_date,
            description: draft.description,
            status: draft.status,
        }
    }
}
