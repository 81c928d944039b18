//! Application service: orchestrates the record store, the clock and the
//! record/transfer mapping.

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::dto::InvestmentDto;
use crate::domain::error::TrackerError;
use crate::domain::filter::FilterParameter;
use crate::domain::investment::{Investment, InvestmentDraft};
use crate::domain::query::{self, DateRange};
use crate::domain::summary::{self, MonthTotal, Summary};
use crate::ports::clock_port::Clock;
use crate::ports::investment_port::InvestmentStore;

pub type SharedStore = Arc<dyn InvestmentStore + Send + Sync>;
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

#[derive(Clone)]
pub struct InvestmentService {
    store: SharedStore,
    clock: SharedClock,
}

impl InvestmentService {
    pub fn new(store: SharedStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// All investments purchased in range, unpaged.
    pub fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<InvestmentDto>, TrackerError> {
        let today = self.clock.today();
        let range = DateRange::resolve(from, to, today);
        let records = self.store.list(range.from, range.to)?;
        debug!(from = %range.from, to = %range.to, count = records.len(), "listed investments");
        Ok(to_dtos(&records, today))
    }

    /// One page of investments; see [`query::search`].
    pub fn search(
        &self,
        params: &FilterParameter,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<InvestmentDto>, TrackerError> {
        params.validate()?;
        let today = self.clock.today();
        let range = DateRange::resolve(from, to, today);
        let records = self.store.list(range.from, range.to)?;
        let page = query::search(&records, range, params);
        debug!(
            sort_field = %params.sort_field,
            page_number = params.page_number,
            page_size = params.page_size,
            returned = page.len(),
            "searched investments"
        );
        Ok(to_dtos(&page, today))
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<InvestmentDto>, TrackerError> {
        let today = self.clock.today();
        Ok(self
            .store
            .get(id)?
            .map(|record| InvestmentDto::from_record(&record, today)))
    }

    pub fn add(&self, draft: InvestmentDraft) -> Result<InvestmentDto, TrackerError> {
        draft.validate()?;
        let now = self.clock.now();
        let created = self.store.insert(&draft, now)?;
        info!(id = created.id, investment_type = %created.investment_type, "investment added");
        Ok(InvestmentDto::from_record(&created, now.date_naive()))
    }

    /// Replaces every client field of investment `id`.
    pub fn update(&self, id: i64, draft: InvestmentDraft) -> Result<(), TrackerError> {
        draft.validate()?;
        let existing = self
            .store
            .get(id)?
            .ok_or(TrackerError::NotFound { id })?;
        let updated = existing.replaced_with(draft, self.clock.now());
        if !self.store.update(&updated)? {
            return Err(TrackerError::NotFound { id });
        }
        info!(id, "investment updated");
        Ok(())
    }

    /// Deleting a missing id is not an error.
    pub fn delete(&self, id: i64) -> Result<(), TrackerError> {
        if self.store.delete(id)? {
            info!(id, "investment deleted");
        } else {
            debug!(id, "delete of missing investment ignored");
        }
        Ok(())
    }

    pub fn summary(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Summary, TrackerError> {
        let range = DateRange::resolve(from, to, self.clock.today());
        let records = self.store.list(range.from, range.to)?;
        Ok(summary::summarize(&records))
    }

    /// Monthly totals for `year`, defaulting to the current year.
    pub fn monthly(&self, year: Option<i32>) -> Result<Vec<MonthTotal>, TrackerError> {
        let year = year.unwrap_or_else(|| self.clock.today().year());
        let (from, to) = year_bounds(year)?;
        let records = self.store.list(from, to)?;
        Ok(summary::monthly_totals(&records, year))
    }
}

fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), TrackerError> {
    let invalid = || TrackerError::InvalidDate {
        field: "year".to_string(),
        value: year.to_string(),
    };
    let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let to = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    Ok((from, to))
}

fn to_dtos(records: &[Investment], today: NaiveDate) -> Vec<InvestmentDto> {
    records
        .iter()
        .map(|r| InvestmentDto::from_record(r, today))
        .collect()
}
