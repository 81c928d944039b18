//! Chart aggregations over a set of investments.

use chrono::{Datelike, Month};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::investment::{Investment, InvestmentStatus, InvestmentType};

/// One slice of a distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation<K> {
    pub key: K,
    pub name: &'static str,
    pub count: usize,
    pub amount: Decimal,
    /// Share of the grand total in percent, two decimal places.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_amount: Decimal,
    pub count: usize,
    pub by_type: Vec<Allocation<InvestmentType>>,
    pub by_status: Vec<Allocation<InvestmentStatus>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub month: &'static str,
    pub total_amount: Decimal,
}

pub fn summarize(investments: &[Investment]) -> Summary {
    let total_amount: Decimal = investments.iter().map(|i| i.amount).sum();
    Summary {
        total_amount,
        count: investments.len(),
        by_type: allocate(investments, total_amount, |i| i.investment_type, |t| t.name()),
        by_status: allocate(investments, total_amount, |i| i.status, |s| s.name()),
    }
}

fn allocate<K: Ord + Copy>(
    investments: &[Investment],
    total: Decimal,
    key: impl Fn(&Investment) -> K,
    name: impl Fn(K) -> &'static str,
) -> Vec<Allocation<K>> {
    let mut groups: BTreeMap<K, (usize, Decimal)> = BTreeMap::new();
    for inv in investments {
        let entry = groups.entry(key(inv)).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += inv.amount;
    }

    groups
        .into_iter()
        .map(|(k, (count, amount))| Allocation {
            key: k,
            name: name(k),
            count,
            amount,
            percentage: percentage_of(amount, total),
        })
        .collect()
}

fn percentage_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / total).round_dp(2)
}

/// Totals per purchase month for `year`, January first. Always twelve entries.
pub fn monthly_totals(investments: &[Investment], year: i32) -> Vec<MonthTotal> {
    let mut totals = [Decimal::ZERO; 12];
    for inv in investments.iter().filter(|i| i.purchased_date.year() == year) {
        totals[inv.purchased_date.month0() as usize] += inv.amount;
    }

    totals
        .into_iter()
        .enumerate()
        .map(|(idx, total_amount)| MonthTotal {
            month: Month::try_from(idx as u8 + 1)
                .map(|m| m.name())
                .unwrap_or_default(),
            total_amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(
        amount: i64,
        kind: InvestmentType,
        status: InvestmentStatus,
        y: i32,
        m: u32,
    ) -> Investment {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Investment {
            id: 0,
            created_on: ts,
            modified_on: ts,
            amount: Decimal::new(amount, 0),
            investment_type: kind,
            purchased_date: NaiveDate::from_ymd_opt(y, m, 15).unwrap(),
            sell_date: None,
            description: None,
            status,
        }
    }

    #[test]
    fn summarize_groups_by_type_in_ordinal_order() {
        let data = vec![
            record(300, InvestmentType::Stocks, InvestmentStatus::Active, 2024, 1),
            record(100, InvestmentType::Fd, InvestmentStatus::Active, 2024, 2),
            record(100, InvestmentType::Stocks, InvestmentStatus::Sold, 2024, 3),
        ];
        let summary = summarize(&data);
        assert_eq!(summary.total_amount, Decimal::new(500, 0));
        assert_eq!(summary.count, 3);

        let types: Vec<_> = summary.by_type.iter().map(|a| a.key).collect();
        assert_eq!(types, vec![InvestmentType::Fd, InvestmentType::Stocks]);
        assert_eq!(summary.by_type[1].amount, Decimal::new(400, 0));
        assert_eq!(summary.by_type[1].count, 2);
        assert_eq!(summary.by_type[1].percentage, Decimal::new(8000, 2));
        assert_eq!(summary.by_type[0].name, "FD");
    }

    #[test]
    fn summarize_by_status_percentages() {
        let data = vec![
            record(1, InvestmentType::Fd, InvestmentStatus::Active, 2024, 1),
            record(1, InvestmentType::Fd, InvestmentStatus::Sold, 2024, 1),
            record(1, InvestmentType::Fd, InvestmentStatus::Matured, 2024, 1),
        ];
        let summary = summarize(&data);
        assert_eq!(summary.by_status.len(), 3);
        for slice in &summary.by_status {
            assert_eq!(slice.percentage, Decimal::new(3333, 2));
        }
    }

    #[test]
    fn summarize_empty_set() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert!(summary.by_type.is_empty());
        assert!(summary.by_status.is_empty());
    }

    #[test]
    fn zero_total_reports_zero_percentages() {
        let data = vec![
            record(50, InvestmentType::Fd, InvestmentStatus::Active, 2024, 1),
            record(-50, InvestmentType::Etf, InvestmentStatus::Active, 2024, 1),
        ];
        let summary = summarize(&data);
        assert!(summary.by_type.iter().all(|a| a.percentage.is_zero()));
    }

    #[test]
    fn monthly_totals_fill_all_months() {
        let data = vec![
            record(100, InvestmentType::Fd, InvestmentStatus::Active, 2024, 1),
            record(50, InvestmentType::Fd, InvestmentStatus::Active, 2024, 1),
            record(70, InvestmentType::Fd, InvestmentStatus::Active, 2024, 12),
            record(999, InvestmentType::Fd, InvestmentStatus::Active, 2023, 12),
        ];
        let months = monthly_totals(&data, 2024);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].month, "January");
        assert_eq!(months[0].total_amount, Decimal::new(150, 0));
        assert_eq!(months[5].total_amount, Decimal::ZERO);
        assert_eq!(months[11].month, "December");
        assert_eq!(months[11].total_amount, Decimal::new(70, 0));
    }
}
