//! Boundary shape of an investment and the explicit mapping to and from
//! [`Investment`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::investment::{Investment, InvestmentDraft, InvestmentStatus, InvestmentType};

/// Investment as exchanged over HTTP and CSV.
///
/// On input, `id` is only compared against the path; `createdOn`,
/// `modifiedOn` and `duration` are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
    pub purchased_date: NaiveDate,
    #[serde(default)]
    pub sell_date: Option<NaiveDate>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub status: InvestmentStatus,
}

impl InvestmentDto {
    /// Projects a stored record, computing `duration` as of `today`.
    pub fn from_record(record: &Investment, today: NaiveDate) -> Self {
        Self {
            id: record.id,
            created_on: Some(record.created_on),
            modified_on: Some(record.modified_on),
            amount: record.amount,
            investment_type: record.investment_type,
            purchased_date: record.purchased_date,
            sell_date: record.sell_date,
            duration: record.holding_days(today),
            description: record.description.clone(),
            status: record.status,
        }
    }

    /// Keeps only the client-owned fields.
    pub fn into_draft(self) -> InvestmentDraft {
        InvestmentDraft {
            amount: self.amount,
            investment_type: self.investment_type,
            purchased_date: self.purchased_date,
            sell_date: self.sell_date,
            description: self.description.filter(|d| !d.is_empty()),
            status: self.status,
        }
    }
}
