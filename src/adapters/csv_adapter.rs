//! CSV import/export of investments.
//!
//! Export writes the transfer shape with enum names; import reads the client
//! fields back, accepting enum names or ordinals and ignoring server fields.

use crate::domain::dto::InvestmentDto;
use crate::domain::error::TrackerError;
use crate::domain::filter::parse_date;
use crate::domain::investment::InvestmentDraft;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

pub const HEADER: [&str; 10] = [
    "id",
    "created_on",
    "modified_on",
    "amount",
    "type",
    "purchased_date",
    "sell_date",
    "duration",
    "description",
    "status",
];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn export(&self, investments: &[InvestmentDto]) -> Result<(), TrackerError> {
        let file = File::create(&self.path)?;
        write_investments(file, investments)?;
        tracing::info!(path = %self.path.display(), rows = investments.len(), "exported investments");
        Ok(())
    }

    pub fn import(&self) -> Result<Vec<InvestmentDraft>, TrackerError> {
        let file = File::open(&self.path)?;
        let drafts = read_drafts(file)?;
        tracing::info!(path = %self.path.display(), rows = drafts.len(), "read investments");
        Ok(drafts)
    }
}

pub fn write_investments<W: Write>(
    writer: W,
    investments: &[InvestmentDto],
) -> Result<(), TrackerError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).map_err(csv_err)?;

    for inv in investments {
        wtr.write_record([
            inv.id.to_string(),
            inv.created_on.map(|t| t.to_rfc3339()).unwrap_or_default(),
            inv.modified_on.map(|t| t.to_rfc3339()).unwrap_or_default(),
            inv.amount.to_string(),
            inv.investment_type.name().to_string(),
            inv.purchased_date.format("%Y-%m-%d").to_string(),
            inv.sell_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            inv.duration.to_string(),
            inv.description.clone().unwrap_or_default(),
            inv.status.name().to_string(),
        ])
        .map_err(csv_err)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn read_drafts<R: Read>(reader: R) -> Result<Vec<InvestmentDraft>, TrackerError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();
    let column = |name: &str| -> Result<usize, TrackerError> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| TrackerError::InvalidRecord {
                reason: format!("missing {name} column"),
            })
    };

    let amount_idx = column("amount")?;
    let type_idx = column("type")?;
    let purchased_idx = column("purchased_date")?;
    let status_idx = column("status")?;
    let sell_idx = column("sell_date").ok();
    let description_idx = column("description").ok();

    let mut drafts = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_err)?;
        // Header is line 1.
        let line = line + 2;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let invalid = |what: &str, value: &str| TrackerError::InvalidRecord {
            reason: format!("line {line}: invalid {what} '{value}'"),
        };

        let amount = Decimal::from_str(field(amount_idx))
            .map_err(|_| invalid("amount", field(amount_idx)))?;
        let investment_type = field(type_idx)
            .parse()
            .map_err(|_| invalid("type", field(type_idx)))?;
        let purchased_date = parse_date(field(purchased_idx))
            .ok_or_else(|| invalid("purchased_date", field(purchased_idx)))?;
        let sell_date = match sell_idx.map(field).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_date(raw).ok_or_else(|| invalid("sell_date", raw))?),
            None => None,
        };
        let description = description_idx
            .map(field)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let status = field(status_idx)
            .parse()
            .map_err(|_| invalid("status", field(status_idx)))?;

        let draft = InvestmentDraft {
            amount,
            investment_type,
            purchased_date,
            sell_date,
            description,
            status,
        };
        draft.validate().map_err(|e| TrackerError::InvalidRecord {
            reason: format!("line {line}: {e}"),
        })?;
        drafts.push(draft);
    }

    Ok(drafts)
}

fn csv_err(e: csv::Error) -> TrackerError {
    if e.is_io_error() {
        if let csv::ErrorKind::Io(io) = e.into_kind() {
            return TrackerError::Io(io);
        }
        return TrackerError::InvalidRecord {
            reason: "csv io error".into(),
        };
    }
    TrackerError::InvalidRecord {
        reason: format!("CSV parse error: {e}"),
    }
}
