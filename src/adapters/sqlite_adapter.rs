//! SQLite investment store.

use crate::domain::config_validation::sqlite_busy_timeout;
use crate::domain::error::TrackerError;
use crate::domain::investment::{
    Investment, InvestmentDraft, InvestmentStatus, InvestmentType, storable_bounds,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::investment_port::InvestmentStore;
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "SELECT id, created_on, modified_on, amount, investment_type, \
                              purchased_date, sell_date, description, status FROM investments";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TrackerError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| TrackerError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;
        let busy_timeout = sqlite_busy_timeout(config)?;

        let manager = SqliteConnectionManager::file(&db_path)
            .with_init(move |conn| conn.busy_timeout(busy_timeout));
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        tracing::info!(path = %db_path, pool_size, "opened sqlite store");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TrackerError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), TrackerError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS investments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_on TEXT NOT NULL,
                modified_on TEXT NOT NULL,
                amount TEXT NOT NULL,
                investment_type INTEGER NOT NULL,
                purchased_date TEXT NOT NULL,
                sell_date TEXT,
                description TEXT,
                status INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_investments_purchased_date
                ON investments(purchased_date);",
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TrackerError> {
        self.pool.get().map_err(pool_err)
    }
}

impl InvestmentStore for SqliteAdapter {
    fn list(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Investment>, TrackerError> {
        let conn = self.conn()?;
        let (from_str, to_str) = sql_date_bounds(from, to);

        let query = format!(
            "{SELECT_COLUMNS} WHERE purchased_date >= ?1 AND purchased_date <= ?2 ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let rows = stmt
            .query_map(params![from_str, to_str], investment_from_row)
            .map_err(query_err)?;

        let mut investments = Vec::new();
        for row in rows {
            investments.push(row.map_err(query_err)?);
        }

        Ok(investments)
    }

    fn get(&self, id: i64) -> Result<Option<Investment>, TrackerError> {
        let conn = self.conn()?;
        let query = format!("{SELECT_COLUMNS} WHERE id = ?1");

        conn.query_row(&query, params![id], investment_from_row)
            .optional()
            .map_err(query_err)
    }

    fn insert(
        &self,
        draft: &InvestmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Investment, TrackerError> {
        let conn = self.conn()?;
        // Timestamps are stored to the microsecond.
        let now = now.trunc_subsecs(6);
        let stamp = format_timestamp(now);

        conn.execute(
            "INSERT INTO investments (created_on, modified_on, amount, investment_type,
                                      purchased_date, sell_date, description, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                stamp,
                stamp,
                draft.amount.to_string(),
                draft.investment_type.ordinal(),
                draft.purchased_date.format(DATE_FORMAT).to_string(),
                draft.sell_date.map(|d| d.format(DATE_FORMAT).to_string()),
                draft.description,
                draft.status.ordinal(),
            ],
        )
        .map_err(query_err)?;

        let id = conn.last_insert_rowid();
        Ok(Investment {
            id,
            created_on: now,
            modified_on: now,
            amount: draft.amount,
            investment_type: draft.investment_type,
            purchased_date: draft.purchased_date,
            sell_date: draft.sell_date,
            description: draft.description.clone(),
            status: draft.status,
        })
    }

    fn update(&self, investment: &Investment) -> Result<bool, TrackerError> {
        let conn = self.conn()?;

        let changed = conn
            .execute(
                "UPDATE investments
                 SET modified_on = ?2, amount = ?3, investment_type = ?4, purchased_date = ?5,
                     sell_date = ?6, description = ?7, status = ?8
                 WHERE id = ?1",
                params![
                    investment.id,
                    format_timestamp(investment.modified_on),
                    investment.amount.to_string(),
                    investment.investment_type.ordinal(),
                    investment.purchased_date.format(DATE_FORMAT).to_string(),
                    investment
                        .sell_date
                        .map(|d| d.format(DATE_FORMAT).to_string()),
                    investment.description,
                    investment.status.ordinal(),
                ],
            )
            .map_err(query_err)?;

        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> Result<bool, TrackerError> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM investments WHERE id = ?1", params![id])
            .map_err(query_err)?;
        Ok(changed > 0)
    }
}

fn investment_from_row(row: &Row<'_>) -> rusqlite::Result<Investment> {
    let sell_date: Option<String> = row.get(6)?;
    Ok(Investment {
        id: row.get(0)?,
        created_on: parse_column(row, 1, parse_timestamp)?,
        modified_on: parse_column(row, 2, parse_timestamp)?,
        amount: parse_column(row, 3, |s| Decimal::from_str(s).map_err(|e| e.to_string()))?,
        investment_type: {
            let ordinal: u8 = row.get(4)?;
            InvestmentType::try_from(ordinal).map_err(|e| conversion_failure(4, e.to_string()))?
        },
        purchased_date: parse_column(row, 5, parse_date)?,
        sell_date: match sell_date {
            Some(s) => Some(parse_date(&s).map_err(|e| conversion_failure(6, e))?),
            None => None,
        },
        description: row.get(7)?,
        status: {
            let ordinal: u8 = row.get(8)?;
            InvestmentStatus::try_from(ordinal).map_err(|e| conversion_failure(8, e.to_string()))?
        },
    })
}

fn parse_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl Fn(&str) -> Result<T, String>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|e| conversion_failure(idx, e))
}

fn conversion_failure(idx: usize, reason: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::other(reason)),
    )
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| e.to_string())
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Dates are stored as `YYYY-MM-DD` text, which only orders correctly for
// four-digit years; drafts outside that range are rejected before insert.
fn sql_date_bounds(from: NaiveDate, to: NaiveDate) -> (String, String) {
    let (from, to) = storable_bounds(from, to);
    (
        from.format(DATE_FORMAT).to_string(),
        to.format(DATE_FORMAT).to_string(),
    )
}

fn pool_err(e: r2d2::Error) -> TrackerError {
    TrackerError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> TrackerError {
    tracing::error!(error = %e, "sqlite query failed");
    TrackerError::DatabaseQuery {
        reason: e.to_string(),
    }
}
