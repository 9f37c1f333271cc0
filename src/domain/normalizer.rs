//! Reshapes gateway tables into the canonical `(date, open, high, low, close)`
//! series.

use crate::domain::error::GatewayError;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::domain::raw_table::{RawCell, RawTable};
use crate::domain::window::Period;
use crate::ports::gateway_port::MarketDataGateway;

const DATE_LABEL: &str = "date";
const CLOSE_LABELS: [&str; 2] = ["close", "adj close"];

/// Converts a raw table into a [`PriceSeries`].
///
/// Hierarchical headers collapse to their first level. The date column is
/// `Date`, else the first label containing "date", else column 0. Rows
/// without a readable date or close are dropped; missing open/high/low
/// are filled from close. A table with no close column yields an empty
/// series.
pub fn normalize(table: &RawTable) -> PriceSeries {
    let labels: Vec<String> = table
        .columns()
        .iter()
        .map(|c| c.first_level().trim().to_lowercase())
        .collect();

    let Some(close_idx) = CLOSE_LABELS.iter().find_map(|l| column(&labels, l)) else {
        return PriceSeries::empty();
    };
    let Some(date_idx) = date_column(&labels) else {
        return PriceSeries::empty();
    };
    let open_idx = column(&labels, "open");
    let high_idx = column(&labels, "high");
    let low_idx = column(&labels, "low");

    let bars = table
        .rows()
        .iter()
        .filter_map(|row| {
            let date = row.get(date_idx)?.as_date()?;
            let close = row.get(close_idx)?.as_number()?;
            let field = |idx: Option<usize>| {
                idx.and_then(|i| row.get(i))
                    .and_then(RawCell::as_number)
                    .unwrap_or(close)
            };
            Some(PriceBar {
                date,
                open: field(open_idx),
                high: field(high_idx),
                low: field(low_idx),
                close,
            })
        })
        .collect();

    PriceSeries::new(bars)
}

fn column(labels: &[String], name: &str) -> Option<usize> {
    labels.iter().position(|l| l == name)
}

fn date_column(labels: &[String]) -> Option<usize> {
    if labels.is_empty() {
        return None;
    }
    column(labels, DATE_LABEL)
        .or_else(|| labels.iter().position(|l| l.contains(DATE_LABEL)))
        .or(Some(0))
}

/// Fetches and normalizes one symbol, keeping the failure reason.
///
/// A table that normalizes to nothing is reported as
/// [`GatewayError::NoData`].
pub fn fetch_series(
    gateway: &dyn MarketDataGateway,
    symbol: &str,
    period: Period,
) -> Result<PriceSeries, GatewayError> {
    let table = gateway.fetch(symbol, period)?;
    let series = normalize(&table);
    if series.is_empty() {
        return Err(GatewayError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(series)
}

/// Like [`fetch_series`] but every failure becomes an empty series.
pub fn fetch_series_or_empty(
    gateway: &dyn MarketDataGateway,
    symbol: &str,
    period: Period,
) -> PriceSeries {
    fetch_series(gateway, symbol, period).unwrap_or_default()
}
