//! Configuration validation.
//!
//! Checks every recognised key that is present; absent keys are valid and
//! fall back to defaults in [`crate::domain::settings`].

use crate::domain::catalog::{parse_catalog_list, Category};
use crate::domain::error::TickerError;
use crate::domain::settings::{parse_key, GatewaySource};
use crate::domain::stats::ChangeBasis;
use crate::domain::window::{Lookback, Period};
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TickerError> {
    validate_suffixes(config)?;
    crypto_max_len(config)?;
    validate_synthetic(config)?;
    validate_gateway(config)?;
    validate_display(config)?;
    validate_catalog(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TickerError {
    TickerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Raw numeric value, `None` when absent. Present but unparseable is an error.
fn number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, TickerError> {
    match config.get_non_empty(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(section, key, format!("'{raw}' is not a number"))),
    }
}

fn integer(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, TickerError> {
    match config.get_non_empty(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{raw}' is not an integer"))),
    }
}

/// `[synthetic]` constant, which must be positive when present.
pub(crate) fn positive_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, TickerError> {
    match number(config, section, key)? {
        Some(value) if value <= 0.0 => {
            Err(invalid(section, key, format!("{key} must be positive")))
        }
        value => Ok(value),
    }
}

pub(crate) fn crypto_max_len(config: &dyn ConfigPort) -> Result<Option<usize>, TickerError> {
    match integer(config, "resolver", "crypto_max_len")? {
        Some(value) if value < 1 => Err(invalid(
            "resolver",
            "crypto_max_len",
            "crypto_max_len must be at least 1",
        )),
        value => Ok(value.map(|v| v as usize)),
    }
}

pub(crate) fn header_rows(config: &dyn ConfigPort) -> Result<Option<usize>, TickerError> {
    match integer(config, "gateway", "header_rows")? {
        Some(rows) if !(1..=2).contains(&rows) => Err(invalid(
            "gateway",
            "header_rows",
            "header_rows must be 1 or 2",
        )),
        rows => Ok(rows.map(|r| r as usize)),
    }
}

pub(crate) fn timeout_secs(config: &dyn ConfigPort) -> Result<Option<u64>, TickerError> {
    match integer(config, "gateway", "timeout_secs")? {
        Some(secs) if secs <= 0 => Err(invalid(
            "gateway",
            "timeout_secs",
            "timeout_secs must be positive",
        )),
        secs => Ok(secs.map(|s| s as u64)),
    }
}

fn validate_suffixes(config: &dyn ConfigPort) -> Result<(), TickerError> {
    for key in ["domestic_suffix", "crypto_suffix"] {
        if config.get_string("resolver", key).is_some()
            && config.get_non_empty("resolver", key).is_none()
        {
            return Err(invalid("resolver", key, format!("{key} must not be empty")));
        }
    }
    Ok(())
}

fn validate_synthetic(config: &dyn ConfigPort) -> Result<(), TickerError> {
    for key in ["troy_ounce_grams", "quarter_multiplier", "half_multiplier"] {
        positive_number(config, "synthetic", key)?;
    }
    Ok(())
}

fn validate_gateway(config: &dyn ConfigPort) -> Result<(), TickerError> {
    parse_key::<GatewaySource>(config, "gateway", "source")?;
    header_rows(config)?;
    timeout_secs(config)?;
    Ok(())
}

fn validate_display(config: &dyn ConfigPort) -> Result<(), TickerError> {
    parse_key::<Period>(config, "display", "period")?;
    parse_key::<Lookback>(config, "display", "lookback")?;
    parse_key::<ChangeBasis>(config, "display", "basis")?;
    Ok(())
}

fn validate_catalog(config: &dyn ConfigPort) -> Result<(), TickerError> {
    for category in Category::ALL {
        let key = category.config_key();
        if let Some(list) = config.get_string("catalog", key) {
            parse_catalog_list(&list).map_err(|source| TickerError::CatalogList {
                key: key.to_string(),
                source,
            })?;
        }
    }
    Ok(())
}
