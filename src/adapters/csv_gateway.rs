//! CSV directory market data gateway.
//!
//! One file per provider symbol, `<base_path>/<SYMBOL>.csv`, with one or two
//! header rows (two for exports that carry a ticker level under each price
//! field).

use crate::domain::error::GatewayError;
use crate::domain::raw_table::{ColumnLabel, RawCell, RawTable};
use crate::domain::window::Period;
use crate::ports::gateway_port::MarketDataGateway;
use chrono::{Duration, NaiveDate};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvGateway {
    base_path: PathBuf,
    header_rows: usize,
}

impl CsvGateway {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            header_rows: 1,
        }
    }

    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows.max(1);
        self
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn read_table(&self, symbol: &str, content: &str) -> Result<RawTable, GatewayError> {
        let parse_error = |e: csv::Error| GatewayError::Parse {
            symbol: symbol.to_string(),
            reason: format!("CSV parse error: {e}"),
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut records = rdr.records();

        let mut header_levels: Vec<Vec<String>> = Vec::with_capacity(self.header_rows);
        for _ in 0..self.header_rows {
            let record = records
                .next()
                .ok_or_else(|| GatewayError::NoData {
                    symbol: symbol.to_string(),
                })?
                .map_err(parse_error)?;
            header_levels.push(record.iter().map(|f| f.trim().to_string()).collect());
        }

        let width = header_levels.iter().map(Vec::len).max().unwrap_or(0);
        let columns = (0..width)
            .map(|i| {
                ColumnLabel::from_levels(
                    header_levels
                        .iter()
                        .map(|level| level.get(i).cloned().unwrap_or_default())
                        .collect(),
                )
            })
            .collect();

        let mut table = RawTable::new(columns);
        for record in records {
            let record = record.map_err(parse_error)?;
            table.push_row(record.iter().map(RawCell::from_field).collect());
        }
        Ok(table)
    }
}

fn row_date(row: &[RawCell]) -> Option<NaiveDate> {
    row.iter().find_map(RawCell::as_date)
}

/// Keeps rows within `period` of the newest dated row. Undated rows are
/// left for the normalizer to discard.
fn trim_to_period(table: &mut RawTable, period: Period) {
    let Some(days) = period.calendar_days() else {
        return;
    };
    let Some(newest) = table.rows().iter().filter_map(|r| row_date(r)).max() else {
        return;
    };
    let cutoff = newest - Duration::days(days);
    table.retain_rows(|row| row_date(row).is_none_or(|d| d > cutoff));
}

impl MarketDataGateway for CsvGateway {
    fn fetch(&self, symbol: &str, period: Period) -> Result<RawTable, GatewayError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => GatewayError::NoData {
                symbol: symbol.to_string(),
            },
            ErrorKind::InvalidData => GatewayError::Parse {
                symbol: symbol.to_string(),
                reason: format!("failed to read {}: {}", path.display(), e),
            },
            _ => GatewayError::Request {
                symbol: symbol.to_string(),
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut table = self.read_table(symbol, &content)?;
        trim_to_period(&mut table, period);

        tracing::debug!(
            symbol,
            period = %period,
            rows = table.rows().len(),
            path = %path.display(),
            "read csv table"
        );
        Ok(table)
    }
}
