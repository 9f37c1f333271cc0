//! Application settings assembled from a [`ConfigPort`].
//!
//! Every key is optional; absent keys take the built-in defaults. Built
//! once at startup and passed by reference afterwards.

use crate::domain::catalog::{parse_catalog_list, Category};
use crate::domain::composer::SyntheticParams;
use crate::domain::config_validation::{crypto_max_len, header_rows, positive_number, timeout_secs};
use crate::domain::error::TickerError;
use crate::domain::resolver::ResolverConfig;
use crate::domain::stats::ChangeBasis;
use crate::domain::window::{Lookback, Period};
use crate::ports::config_port::ConfigPort;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewaySource {
    #[default]
    Csv,
    Yahoo,
}

impl fmt::Display for GatewaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewaySource::Csv => f.write_str("csv"),
            GatewaySource::Yahoo => f.write_str("yahoo"),
        }
    }
}

impl FromStr for GatewaySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(GatewaySource::Csv),
            "yahoo" => Ok(GatewaySource::Yahoo),
            other => Err(format!("unknown gateway source '{other}' (expected csv or yahoo)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    pub source: GatewaySource,
    pub data_dir: PathBuf,
    pub header_rows: usize,
    pub timeout_secs: u64,
    pub base_url: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            source: GatewaySource::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            header_rows: 1,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySettings {
    pub period: Period,
    pub lookback: Lookback,
    pub basis: ChangeBasis,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub resolver: ResolverConfig,
    pub synthetic: SyntheticParams,
    pub gateway: GatewaySettings,
    pub display: DisplaySettings,
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TickerError> {
        Ok(Self {
            resolver: build_resolver_config(config)?,
            synthetic: build_synthetic_params(config)?,
            gateway: build_gateway_settings(config)?,
            display: build_display_settings(config)?,
        })
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TickerError {
    TickerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Parses `[section] key` with `FromStr`, or `None` when absent.
pub(crate) fn parse_key<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TickerError>
where
    T: FromStr<Err = String>,
{
    config
        .get_non_empty(section, key)
        .map(|raw| raw.parse::<T>().map_err(|reason| invalid(section, key, reason)))
        .transpose()
}

pub fn build_resolver_config(config: &dyn ConfigPort) -> Result<ResolverConfig, TickerError> {
    let mut resolver = ResolverConfig::default();

    if let Some(v) = config.get_non_empty("resolver", "domestic_suffix") {
        resolver.domestic_suffix = v;
    }
    if let Some(v) = config.get_non_empty("resolver", "crypto_suffix") {
        resolver.crypto_suffix = v;
    }
    if let Some(max_len) = crypto_max_len(config)? {
        resolver.crypto_max_len = max_len;
    }
    if let Some(v) = config.get_non_empty("resolver", "default_symbol") {
        resolver.default_symbol = v;
    }
    if let Some(v) = config.get_non_empty("resolver", "default_name") {
        resolver.default_name = v;
    }

    for category in Category::ALL {
        let key = category.config_key();
        if let Some(list) = config.get_non_empty("catalog", key) {
            let items = parse_catalog_list(&list).map_err(|source| TickerError::CatalogList {
                key: key.to_string(),
                source,
            })?;
            resolver.catalog = resolver.catalog.with_category(category, items);
        }
    }

    Ok(resolver)
}

pub fn build_synthetic_params(config: &dyn ConfigPort) -> Result<SyntheticParams, TickerError> {
    let defaults = SyntheticParams::default();
    Ok(SyntheticParams {
        gold_symbol: config
            .get_non_empty("synthetic", "gold_symbol")
            .unwrap_or(defaults.gold_symbol),
        silver_symbol: config
            .get_non_empty("synthetic", "silver_symbol")
            .unwrap_or(defaults.silver_symbol),
        fx_symbol: config
            .get_non_empty("synthetic", "fx_symbol")
            .unwrap_or(defaults.fx_symbol),
        troy_ounce_grams: positive_number(config, "synthetic", "troy_ounce_grams")?
            .unwrap_or(defaults.troy_ounce_grams),
        quarter_multiplier: positive_number(config, "synthetic", "quarter_multiplier")?
            .unwrap_or(defaults.quarter_multiplier),
        half_multiplier: positive_number(config, "synthetic", "half_multiplier")?
            .unwrap_or(defaults.half_multiplier),
    })
}

pub fn build_gateway_settings(config: &dyn ConfigPort) -> Result<GatewaySettings, TickerError> {
    let defaults = GatewaySettings::default();

    Ok(GatewaySettings {
        source: parse_key(config, "gateway", "source")?.unwrap_or(defaults.source),
        data_dir: config
            .get_non_empty("gateway", "data_dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir),
        header_rows: header_rows(config)?.unwrap_or(defaults.header_rows),
        timeout_secs: timeout_secs(config)?.unwrap_or(defaults.timeout_secs),
        base_url: config
            .get_non_empty("gateway", "base_url")
            .unwrap_or(defaults.base_url),
    })
}

pub fn build_display_settings(config: &dyn ConfigPort) -> Result<DisplaySettings, TickerError> {
    Ok(DisplaySettings {
        period: parse_key(config, "display", "period")?.unwrap_or_default(),
        lookback: parse_key(config, "display", "lookback")?.unwrap_or_default(),
        basis: parse_key(config, "display", "basis")?.unwrap_or_default(),
    })
}
