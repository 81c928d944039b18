//! PostgreSQL investment store.

use crate::domain::error::TrackerError;
use crate::domain::investment::{
    Investment, InvestmentDraft, InvestmentStatus, InvestmentType, storable_bounds,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::investment_port::InvestmentStore;
use chrono::{DateTime, NaiveDate, Utc};
use postgres::types::ToSql;
use postgres::{NoTls, Row};
use r2d2::{Pool, PooledConnection};
use r2d2_postgres::PostgresConnectionManager;

type Manager = PostgresConnectionManager<NoTls>;

const COLUMNS: &str = "id, created_on, modified_on, amount, investment_type, \
                       purchased_date, sell_date, description, status";

pub struct PostgresAdapter {
    pool: Pool<Manager>,
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TrackerError> {
        let connection_string = config
            .get_string("postgres", "connection_string")
            .ok_or_else(|| TrackerError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let pg_config: postgres::Config =
            connection_string
                .parse()
                .map_err(|e: postgres::Error| TrackerError::ConfigInvalid {
                    section: "postgres".into(),
                    key: "connection_string".into(),
                    reason: e.to_string(),
                })?;

        let pool_size = config.get_int("postgres", "pool_size", 4) as u32;
        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| TrackerError::Database {
                reason: e.to_string(),
            })?;

        tracing::info!(pool_size, "opened postgres store");
        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), TrackerError> {
        self.conn()?
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS public.investments (
                    id BIGSERIAL PRIMARY KEY,
                    created_on TIMESTAMPTZ NOT NULL,
                    modified_on TIMESTAMPTZ NOT NULL,
                    amount NUMERIC NOT NULL,
                    investment_type SMALLINT NOT NULL,
                    purchased_date DATE NOT NULL,
                    sell_date DATE,
                    description TEXT,
                    status SMALLINT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_investments_purchased_date
                    ON public.investments(purchased_date);",
            )
            .map_err(query_err)
    }

    fn conn(&self) -> Result<PooledConnection<Manager>, TrackerError> {
        self.pool.get().map_err(|e| TrackerError::Database {
            reason: e.to_string(),
        })
    }
}

impl InvestmentStore for PostgresAdapter {
    fn list(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Investment>, TrackerError> {
        let (from, to) = storable_bounds(from, to);
        let query = format!(
            "SELECT {COLUMNS} FROM public.investments \
             WHERE purchased_date >= $1 AND purchased_date <= $2 ORDER BY id ASC"
        );
        let params: &[&(dyn ToSql + Sync)] = &[&from, &to];
        let rows = self.conn()?.query(&query, params).map_err(query_err)?;

        rows.iter().map(investment_from_row).collect()
    }

    fn get(&self, id: i64) -> Result<Option<Investment>, TrackerError> {
        let query = format!("SELECT {COLUMNS} FROM public.investments WHERE id = $1");
        let row = self
            .conn()?
            .query_opt(&query, &[&id])
            .map_err(query_err)?;

        row.as_ref().map(investment_from_row).transpose()
    }

    fn insert(
        &self,
        draft: &InvestmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Investment, TrackerError> {
        let type_ordinal = draft.investment_type.ordinal() as i16;
        let status_ordinal = draft.status.ordinal() as i16;
        let params: &[&(dyn ToSql + Sync)] = &[
            &now,
            &draft.amount,
            &type_ordinal,
            &draft.purchased_date,
            &draft.sell_date,
            &draft.description,
            &status_ordinal,
        ];

        let query = format!(
            "INSERT INTO public.investments (created_on, modified_on, amount, investment_type,
                                             purchased_date, sell_date, description, status)
             VALUES ($1, $1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let row = self.conn()?.query_one(&query, params).map_err(query_err)?;

        investment_from_row(&row)
    }

    fn update(&self, investment: &Investment) -> Result<bool, TrackerError> {
        let type_ordinal = investment.investment_type.ordinal() as i16;
        let status_ordinal = investment.status.ordinal() as i16;
        let params: &[&(dyn ToSql + Sync)] = &[
            &investment.id,
            &investment.modified_on,
            &investment.amount,
            &type_ordinal,
            &investment.purchased_date,
            &investment.sell_date,
            &investment.description,
            &status_ordinal,
        ];

        let changed = self
            .conn()?
            .execute(
                "UPDATE public.investments
                 SET modified_on = $2, amount = $3, investment_type = $4, purchased_date = $5,
                     sell_date = $6, description = $7, status = $8
                 WHERE id = $1",
                params,
            )
            .map_err(query_err)?;

        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> Result<bool, TrackerError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM public.investments WHERE id = $1", &[&id])
            .map_err(query_err)?;
        Ok(changed > 0)
    }
}

fn investment_from_row(row: &Row) -> Result<Investment, TrackerError> {
    let type_ordinal: i16 = row.get(4);
    let status_ordinal: i16 = row.get(8);

    Ok(Investment {
        id: row.get(0),
        created_on: row.get(1),
        modified_on: row.get(2),
        amount: row.get(3),
        investment_type: u8::try_from(type_ordinal)
            .ok()
            .and_then(InvestmentType::from_ordinal)
            .ok_or_else(|| TrackerError::Database {
                reason: format!("unknown investment_type {type_ordinal}"),
            })?,
        purchased_date: row.get(5),
        sell_date: row.get(6),
        description: row.get(7),
        status: u8::try_from(status_ordinal)
            .ok()
            .and_then(InvestmentStatus::from_ordinal)
            .ok_or_else(|| TrackerError::Database {
                reason: format!("unknown status {status_ordinal}"),
            })?,
    })
}

fn query_err(e: postgres::Error) -> TrackerError {
    // The top-level Display is only "db error"; the server message is in the source.
    let reason = match e.as_db_error() {
        Some(db) => format!("{}: {}", db.code().code(), db.message()),
        None => e.to_string(),
    };
    tracing::error!(error = ?e, %reason, "postgres query failed");
    TrackerError::DatabaseQuery { reason }
}
