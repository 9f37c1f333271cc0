//! Market data gateway port.

use crate::domain::error::GatewayError;
use crate::domain::raw_table::RawTable;
use crate::domain::window::Period;

/// Source of raw daily price tables keyed by provider symbol.
///
/// Implementations bound their own latency (timeouts); a slow provider is
/// reported as [`GatewayError::Timeout`].
pub trait MarketDataGateway {
    fn fetch(&self, symbol: &str, period: Period) -> Result<RawTable, GatewayError>;
}
