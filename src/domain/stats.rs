//! Windowed performance statistics.
//!
//! change% = (latest - start) / start * 100
//! If start == 0: change is undefined (`None`).

use crate::domain::error::TickerError;
use crate::domain::price::PriceSeries;
use std::fmt;
use std::str::FromStr;

/// Which close the change is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeBasis {
    /// First bar of the trailing window.
    #[default]
    WindowStart,
    /// The bar immediately before the latest one (day-over-day).
    PreviousBar,
}

impl fmt::Display for ChangeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeBasis::WindowStart => f.write_str("window"),
            ChangeBasis::PreviousBar => f.write_str("previous"),
        }
    }
}

impl FromStr for ChangeBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" | "window_start" => Ok(ChangeBasis::WindowStart),
            "previous" | "previous_bar" | "daily" => Ok(ChangeBasis::PreviousBar),
            other => Err(format!(
                "unknown change basis '{other}' (expected window or previous)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceStats {
    pub latest_price: f64,
    pub window_start_price: f64,
    /// `None` when the start price is zero.
    pub percent_change: Option<f64>,
    pub window_high: f64,
    pub bars_in_window: usize,
}

impl PerformanceStats {
    /// `Some(true)` for a rise, `Some(false)` for a fall or flat period.
    pub fn is_up(&self) -> Option<bool> {
        self.percent_change.map(|pct| pct > 0.0)
    }
}

/// Stats over the trailing `window_bars` bars, measured from the window start.
pub fn compute_stats(
    series: &PriceSeries,
    window_bars: usize,
) -> Result<PerformanceStats, TickerError> {
    compute_stats_with_basis(series, window_bars, ChangeBasis::WindowStart)
}

/// Stats over the trailing `window_bars` bars (the whole series if shorter;
/// zero counts as one).
pub fn compute_stats_with_basis(
    series: &PriceSeries,
    window_bars: usize,
    basis: ChangeBasis,
) -> Result<PerformanceStats, TickerError> {
    let bars = series.bars();
    if bars.is_empty() {
        return Err(TickerError::InsufficientData {
            bars: 0,
            minimum: 1,
        });
    }

    let window = series.tail(window_bars.max(1));
    let latest_price = bars[bars.len() - 1].close;

    let start_index = match basis {
        ChangeBasis::WindowStart => bars.len() - window.len(),
        ChangeBasis::PreviousBar => bars.len().saturating_sub(2),
    };
    let window_start_price = bars[start_index].close;

    let percent_change = if window_start_price == 0.0 {
        None
    } else {
        Some((latest_price - window_start_price) / window_start_price * 100.0)
            .filter(|pct| pct.is_finite())
    };

    let window_high = window
        .iter()
        .map(|bar| bar.high)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(PerformanceStats {
        latest_price,
        window_start_price,
        percent_change,
        window_high,
        bars_in_window: window.len(),
    })
}
