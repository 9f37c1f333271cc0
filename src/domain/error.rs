//! Domain error types.

/// Failure reported by a market data gateway.
///
/// The presentation layer usually collapses every variant into "no data";
/// the reason is kept so it can be logged.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request for {symbol} failed: {reason}")]
    Request { symbol: String, reason: String },

    #[error("request for {symbol} timed out")]
    Timeout { symbol: String },

    #[error("provider error for {symbol} [{code}]: {description}")]
    Provider {
        symbol: String,
        code: String,
        description: String,
    },

    #[error("malformed response for {symbol}: {reason}")]
    Parse { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error parsing a comma-separated catalog list from configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogListError {
    #[error("empty token in catalog list")]
    EmptyToken,

    #[error("duplicate catalog entry: {0}")]
    DuplicateEntry(String),
}

/// Top-level error type for tickerlens.
#[derive(Debug, thiserror::Error)]
pub enum TickerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid catalog list [catalog] {key}: {source}")]
    CatalogList {
        key: String,
        #[source]
        source: CatalogListError,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data: have {bars} bars, need at least {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TickerError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            TickerError::Io(_) => 1,
            TickerError::ConfigParse { .. }
            | TickerError::ConfigMissing { .. }
            | TickerError::ConfigInvalid { .. }
            | TickerError::CatalogList { .. } => 2,
            TickerError::Gateway(_) => 3,
            TickerError::NoData { .. } | TickerError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&TickerError> for std::process::ExitCode {
    fn from(err: &TickerError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
