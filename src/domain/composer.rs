//! Synthetic instruments priced from two quoted series.
//!
//! gram = metal_close (USD/oz) * fx_close (local/USD) / grams-per-troy-ounce
//!
//! The two base series come from markets with different trading calendars,
//! so they are inner-joined on date. A date missing from either side
//! produces no bar.

use crate::domain::catalog::{InstrumentKey, SyntheticKey};
use crate::domain::error::GatewayError;
use crate::domain::normalizer::fetch_series;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::domain::window::Period;
use crate::ports::gateway_port::MarketDataGateway;

pub const TROY_OUNCE_GRAMS: f64 = 31.1034768;
pub const QUARTER_GOLD_MULTIPLIER: f64 = 1.63;
pub const HALF_GOLD_MULTIPLIER: f64 = 3.26;

/// Base symbols and conversion constants for synthetic instruments.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticParams {
    pub gold_symbol: String,
    pub silver_symbol: String,
    /// Local currency per USD.
    pub fx_symbol: String,
    pub troy_ounce_grams: f64,
    pub quarter_multiplier: f64,
    pub half_multiplier: f64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            gold_symbol: "GC=F".to_string(),
            silver_symbol: "SI=F".to_string(),
            fx_symbol: "TRY=X".to_string(),
            troy_ounce_grams: TROY_OUNCE_GRAMS,
            quarter_multiplier: QUARTER_GOLD_MULTIPLIER,
            half_multiplier: HALF_GOLD_MULTIPLIER,
        }
    }
}

impl SyntheticParams {
    pub fn metal_symbol(&self, key: SyntheticKey) -> &str {
        if key.is_silver() {
            &self.silver_symbol
        } else {
            &self.gold_symbol
        }
    }

    /// Weight multiplier applied to the gram price.
    pub fn multiplier(&self, key: SyntheticKey) -> f64 {
        match key {
            SyntheticKey::GramGold | SyntheticKey::GramSilver => 1.0,
            SyntheticKey::QuarterGold => self.quarter_multiplier,
            SyntheticKey::HalfGold => self.half_multiplier,
        }
    }
}

/// Derives the synthetic series from already-fetched base series.
///
/// Bars are flat (open = high = low = close). Empty when either input is
/// empty or the two share no dates.
pub fn compose_from(
    key: SyntheticKey,
    metal: &PriceSeries,
    fx: &PriceSeries,
    params: &SyntheticParams,
) -> PriceSeries {
    let fx_by_date = fx.close_index();
    let multiplier = params.multiplier(key);

    let bars = metal
        .bars()
        .iter()
        .filter_map(|bar| {
            let fx_close = fx_by_date.get(&bar.date)?;
            let gram = (bar.close * fx_close) / params.troy_ounce_grams;
            Some(PriceBar::flat(bar.date, gram * multiplier))
        })
        .collect();

    PriceSeries::new(bars)
}

/// Fetches both bases and composes, reporting which step failed.
pub fn compose_checked(
    gateway: &dyn MarketDataGateway,
    key: SyntheticKey,
    period: Period,
    params: &SyntheticParams,
) -> Result<PriceSeries, GatewayError> {
    let metal = fetch_series(gateway, params.metal_symbol(key), period)?;
    let fx = fetch_series(gateway, &params.fx_symbol, period)?;

    let series = compose_from(key, &metal, &fx, params);
    if series.is_empty() {
        return Err(GatewayError::NoData {
            symbol: key.as_str().to_string(),
        });
    }
    Ok(series)
}

/// Synthetic series for `key`, empty on any failure.
pub fn compose(
    gateway: &dyn MarketDataGateway,
    key: SyntheticKey,
    period: Period,
    params: &SyntheticParams,
) -> PriceSeries {
    compose_checked(gateway, key, period, params).unwrap_or_default()
}

/// Series for any resolved key: synthetic keys are composed, provider
/// symbols fetched directly.
pub fn load_instrument(
    gateway: &dyn MarketDataGateway,
    key: &InstrumentKey,
    period: Period,
    params: &SyntheticParams,
) -> Result<PriceSeries, GatewayError> {
    match key {
        InstrumentKey::Synthetic(synthetic) => compose_checked(gateway, *synthetic, period, params),
        InstrumentKey::Provider(symbol) => fetch_series(gateway, symbol, period),
    }
}
