//! Record store port for investments.

use crate::domain::error::TrackerError;
use crate::domain::investment::{Investment, InvestmentDraft};
use chrono::{DateTime, NaiveDate, Utc};

/// CRUD persistence keyed by the store-assigned integer id.
///
/// Listing returns rows in ascending id order.
pub trait InvestmentStore {
    /// Rows whose `purchased_date` lies in `from..=to`.
    fn list(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Investment>, TrackerError>;

    fn get(&self, id: i64) -> Result<Option<Investment>, TrackerError>;

    /// Persists a new row with both timestamps set to `now` and returns it with its id.
    fn insert(&self, draft: &InvestmentDraft, now: DateTime<Utc>)
    -> Result<Investment, TrackerError>;

    /// Overwrites the row with `investment.id`. Returns `false` when no such row exists.
    fn update(&self, investment: &Investment) -> Result<bool, TrackerError>;

    /// Returns `false` when no such row existed.
    fn delete(&self, id: i64) -> Result<bool, TrackerError>;
}
