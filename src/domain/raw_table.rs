//! Untyped price table as returned by a market data gateway.
//!
//! Providers disagree on header shape (flat vs. two-level), on the name of
//! the date column and on which price fields are present. [`RawTable`]
//! records what came back without interpreting it; the normalizer does the
//! interpretation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A column header, one entry per header level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel {
    levels: Vec<String>,
}

impl ColumnLabel {
    pub fn flat(name: &str) -> Self {
        Self {
            levels: vec![name.to_string()],
        }
    }

    pub fn nested(levels: &[&str]) -> Self {
        Self {
            levels: levels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn from_levels(levels: Vec<String>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn first_level(&self) -> &str {
        self.levels.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_hierarchical(&self) -> bool {
        self.levels.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Date(NaiveDate),
    Number(f64),
    Text(String),
    Missing,
}

impl RawCell {
    /// Classifies a text field: blank and `nan`/`null` are missing, numbers
    /// become [`RawCell::Number`], everything else stays text.
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
        {
            return RawCell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => RawCell::Number(value),
            Err(_) => RawCell::Text(trimmed.to_string()),
        }
    }

    /// Finite numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawCell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Calendar date, reading `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and
    /// RFC 3339 text.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            RawCell::Date(d) => Some(*d),
            RawCell::Text(s) => parse_date_text(s),
            _ => None,
        }
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z")
                .ok()
                .map(|dt| dt.date_naive())
        })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<ColumnLabel>,
    rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(columns: Vec<ColumnLabel>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Convenience constructor for single-level headers.
    pub fn with_flat_columns(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| ColumnLabel::flat(n)).collect())
    }

    pub fn push_row(&mut self, row: Vec<RawCell>) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }

    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&Vec<RawCell>) -> bool,
    {
        self.rows.retain(keep);
    }
}
