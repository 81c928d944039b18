#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use invtracker::domain::error::TrackerError;
use invtracker::domain::investment::{
    Investment, InvestmentDraft, InvestmentStatus, InvestmentType,
};
use invtracker::ports::clock_port::FixedClock;
use invtracker::ports::investment_port::InvestmentStore;
use invtracker::service::InvestmentService;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

/// In-memory store with sequential ids.
pub struct MockStore {
    rows: Mutex<Vec<Investment>>,
    next_id: Mutex<i64>,
    fail_with: Option<String>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            fail_with: None,
        }
    }

    /// A store whose every call fails with a database error.
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), TrackerError> {
        match &self.fail_with {
            Some(reason) => Err(TrackerError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl InvestmentStore for MockStore {
    fn list(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Investment>, TrackerError> {
        self.check()?;
        let mut rows: Vec<Investment> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.purchased_date >= from && r.purchased_date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    fn get(&self, id: i64) -> Result<Option<Investment>, TrackerError> {
        self.check()?;
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    fn insert(
        &self,
        draft: &InvestmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Investment, TrackerError> {
        self.check()?;
        let mut next_id = self.next_id.lock().unwrap();
        let record = Investment {
            id: *next_id,
            created_on: now,
            modified_on: now,
            amount: draft.amount,
            investment_type: draft.investment_type,
            purchased_date: draft.purchased_date,
            sell_date: draft.sell_date,
            description: draft.description.clone(),
            status: draft.status,
        };
        *next_id += 1;
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    fn update(&self, investment: &Investment) -> Result<bool, TrackerError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == investment.id) {
            Some(row) => {
                *row = investment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: i64) -> Result<bool, TrackerError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Noon UTC on the given day.
pub fn instant(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn draft(
    amount: i64,
    investment_type: InvestmentType,
    purchased: &str,
    sold: Option<&str>,
    status: InvestmentStatus,
) -> InvestmentDraft {
    InvestmentDraft {
        amount: Decimal::from(amount),
        investment_type,
        purchased_date: parse_date(purchased),
        sell_date: sold.map(parse_date),
        description: None,
        status,
    }
}

pub fn described(mut draft: InvestmentDraft, description: &str) -> InvestmentDraft {
    draft.description = Some(description.to_string());
    draft
}

/// Service over a fresh [`MockStore`] with the clock pinned to `now`.
pub fn service_at(now: DateTime<Utc>) -> (InvestmentService, Arc<MockStore>) {
    let store = Arc::new(MockStore::new());
    let service = InvestmentService::new(store.clone(), Arc::new(FixedClock(now)));
    (service, store)
}

/// The four demo investments, added in order with ids 1..=4.
pub fn seed(service: &InvestmentService) {
    let rows = [
        described(
            draft(2000, InvestmentType::Etf, "2023-01-01", None, InvestmentStatus::Active),
            "Nifty index ETF",
        ),
        described(
            draft(
                5000,
                InvestmentType::MutualFunds,
                "2023-01-01",
                None,
                InvestmentStatus::Active,
            ),
            "Flexi cap fund",
        ),
        described(
            draft(
                3000,
                InvestmentType::CorporateBond,
                "2023-01-01",
                Some("2023-04-01"),
                InvestmentStatus::Matured,
            ),
            "Short term bond",
        ),
        described(
            draft(1000, InvestmentType::Stocks, "2023-06-01", None, InvestmentStatus::Active),
            "Bank shares",
        ),
    ];
    for row in rows {
        service.add(row).unwrap();
    }
}
