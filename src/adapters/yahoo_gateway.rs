//! Yahoo Finance chart API gateway.
//!
//! `GET {base_url}/{symbol}?range={period}&interval=1d`. The JSON body is
//! parsed into a flat [`RawTable`] (`Date, Open, High, Low, Close,
//! [Adj Close,] Volume`); `null` entries become [`RawCell::Missing`].

use crate::domain::error::GatewayError;
use crate::domain::raw_table::{RawCell, RawTable};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Exchange-local calendar date of a bar timestamp. `None` when out of range.
fn bar_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    timestamp
        .checked_add(gmtoffset)
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .map(|dt| dt.date_naive())
}

fn cell(values: &[Option<f64>], i: usize) -> RawCell {
    match values.get(i).copied().flatten() {
        Some(v) => RawCell::Number(v),
        None => RawCell::Missing,
    }
}

/// Parses a chart API response body.
pub fn parse_chart(symbol: &str, json: &str) -> Result<RawTable, GatewayError> {
    let response: ChartResponse =
        serde_json::from_str(json).map_err(|e| GatewayError::Parse {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

    if let Some(error) = response.chart.error {
        return Err(GatewayError::Provider {
            symbol: symbol.to_string(),
            code: error.code,
            description: error.description,
        });
    }

    let no_data = || GatewayError::NoData {
        symbol: symbol.to_string(),
    };
    let data = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(no_data)?;
    if data.timestamp.is_empty() {
        return Err(no_data());
    }

    let gmtoffset = data.meta.map(|m| m.gmtoffset).unwrap_or(0);
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose);

    let mut names = vec!["Date", "Open", "High", "Low", "Close"];
    if adjclose.is_some() {
        names.push("Adj Close");
    }
    names.push("Volume");
    let mut table = RawTable::with_flat_columns(&names);

    for (i, &ts) in data.timestamp.iter().enumerate() {
        let date = match bar_date(ts, gmtoffset) {
            Some(d) => RawCell::Date(d),
            None => RawCell::Missing,
        };
        let mut row = vec![
            date,
            cell(&quote.open, i),
            cell(&quote.high, i),
            cell(&quote.low, i),
            cell(&quote.close, i),
        ];
        if let Some(values) = &adjclose {
            row.push(cell(values, i));
        }
        row.push(cell(&quote.volume, i));
        table.push_row(row);
    }

    Ok(table)
}

#[cfg(feature = "yahoo")]
pub use client::YahooGateway;

#[cfg(feature = "yahoo")]
mod client {
    use super::parse_chart;
    use crate::domain::error::GatewayError;
    use crate::domain::raw_table::RawTable;
    use crate::domain::window::Period;
    use crate::ports::gateway_port::MarketDataGateway;
    use reqwest::Url;
    use reqwest::blocking::Client;
    use std::time::Duration;

    const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

    /// Blocking chart API client. Every request is bounded by `timeout`.
    pub struct YahooGateway {
        client: Client,
        base_url: Url,
    }

    impl YahooGateway {
        pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
            let request_error = |reason: String| GatewayError::Request {
                symbol: String::new(),
                reason,
            };
            let base_url = Url::parse(base_url)
                .map_err(|e| request_error(format!("invalid base url {base_url}: {e}")))?;
            let client = Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .map_err(|e| request_error(e.to_string()))?;
            Ok(Self { client, base_url })
        }

        /// The symbol is appended as one path segment, so `/` and `%` in it
        /// are escaped.
        pub fn chart_url(&self, symbol: &str, period: Period) -> Result<Url, GatewayError> {
            let mut url = self.base_url.clone();
            url.path_segments_mut()
                .map_err(|_| GatewayError::Request {
                    symbol: symbol.to_string(),
                    reason: format!("base url {} cannot take a path", self.base_url),
                })?
                .pop_if_empty()
                .push(symbol);
            url.query_pairs_mut()
                .append_pair("range", period.as_str())
                .append_pair("interval", "1d");
            Ok(url)
        }
    }

    impl MarketDataGateway for YahooGateway {
        fn fetch(&self, symbol: &str, period: Period) -> Result<RawTable, GatewayError> {
            let url = self.chart_url(symbol, period)?;
            tracing::debug!(symbol, url = %url, "requesting chart");

            let failed = |e: reqwest::Error| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        symbol: symbol.to_string(),
                    }
                } else {
                    GatewayError::Request {
                        symbol: symbol.to_string(),
                        reason: e.to_string(),
                    }
                }
            };

            let response = self.client.get(url).send().map_err(failed)?;
            let status = response.status();
            let body = response.text().map_err(failed)?;

            // Chart errors arrive with a 4xx status and a JSON error body.
            let table = parse_chart(symbol, &body).map_err(|e| match e {
                GatewayError::Parse { .. } if !status.is_success() => GatewayError::Request {
                    symbol: symbol.to_string(),
                    reason: format!("HTTP {status}"),
                },
                other => other,
            })?;

            tracing::debug!(symbol, rows = table.rows().len(), "chart received");
            Ok(table)
        }
    }

}
