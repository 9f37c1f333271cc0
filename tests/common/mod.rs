#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use tickerlens::domain::error::GatewayError;
use tickerlens::domain::raw_table::{RawCell, RawTable};
use tickerlens::domain::window::Period;
use tickerlens::ports::gateway_port::MarketDataGateway;

pub struct MockGateway {
    pub tables: HashMap<String, RawTable>,
    pub errors: HashMap<String, String>,
    pub timeouts: Vec<String>,
    pub requests: RefCell<Vec<(String, Period)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            errors: HashMap::new(),
            timeouts: Vec::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_table(mut self, symbol: &str, table: RawTable) -> Self {
        self.tables.insert(symbol.to_string(), table);
        self
    }

    pub fn with_closes(self, symbol: &str, closes: &[(&str, f64)]) -> Self {
        self.with_table(symbol, close_table(closes))
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn with_timeout(mut self, symbol: &str) -> Self {
        self.timeouts.push(symbol.to_string());
        self
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|(s, _)| s.clone()).collect()
    }
}

impl MarketDataGateway for MockGateway {
    fn fetch(&self, symbol: &str, period: Period) -> Result<RawTable, GatewayError> {
        self.requests.borrow_mut().push((symbol.to_string(), period));
        if self.timeouts.iter().any(|s| s == symbol) {
            return Err(GatewayError::Timeout {
                symbol: symbol.to_string(),
            });
        }
        if let Some(reason) = self.errors.get(symbol) {
            return Err(GatewayError::Request {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        self.tables
            .get(symbol)
            .cloned()
            .ok_or_else(|| GatewayError::NoData {
                symbol: symbol.to_string(),
            })
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// `Date, Close` table.
pub fn close_table(closes: &[(&str, f64)]) -> RawTable {
    let mut table = RawTable::with_flat_columns(&["Date", "Close"]);
    for (d, close) in closes {
        table.push_row(vec![RawCell::Date(date(d)), RawCell::Number(*close)]);
    }
    table
}

/// Full OHLC table with high = close + 1 and low = close - 1.
pub fn ohlc_table(closes: &[(&str, f64)]) -> RawTable {
    let mut table = RawTable::with_flat_columns(&["Date", "Open", "High", "Low", "Close"]);
    for (d, close) in closes {
        table.push_row(vec![
            RawCell::Date(date(d)),
            RawCell::Number(*close),
            RawCell::Number(close + 1.0),
            RawCell::Number(close - 1.0),
            RawCell::Number(*close),
        ]);
    }
    table
}

/// `n` consecutive January 2024 dates with closes 1.0, 2.0, ...
pub fn daily_closes(n: usize) -> Vec<(String, f64)> {
    (0..n)
        .map(|i| (format!("2024-01-{:02}", i + 1), (i + 1) as f64))
        .collect()
}

pub fn as_refs(rows: &[(String, f64)]) -> Vec<(&str, f64)> {
    rows.iter().map(|(d, c)| (d.as_str(), *c)).collect()
}
