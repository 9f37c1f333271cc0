//! Retrieval periods and display lookbacks.

use std::fmt;
use std::str::FromStr;

/// How much history to request from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    #[default]
    TwoYears,
    FiveYears,
    Max,
}

impl Period {
    /// Provider range token (`1mo`, `2y`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    /// Calendar days covered, `None` for unbounded.
    pub fn calendar_days(&self) -> Option<i64> {
        match self {
            Period::OneMonth => Some(31),
            Period::ThreeMonths => Some(92),
            Period::SixMonths => Some(183),
            Period::OneYear => Some(366),
            Period::TwoYears => Some(731),
            Period::FiveYears => Some(1827),
            Period::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "max" => Ok(Period::Max),
            other => Err(format!(
                "unknown period '{other}' (expected 1mo, 3mo, 6mo, 1y, 2y, 5y or max)"
            )),
        }
    }
}

/// Trailing number of bars used for performance stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lookback {
    Week,
    Month,
    #[default]
    SixMonths,
    Year,
    Bars(usize),
}

impl Lookback {
    pub fn bars(&self) -> usize {
        match self {
            Lookback::Week => 7,
            Lookback::Month => 30,
            Lookback::SixMonths => 180,
            Lookback::Year => 365,
            Lookback::Bars(n) => *n,
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Week => f.write_str("1W"),
            Lookback::Month => f.write_str("1M"),
            Lookback::SixMonths => f.write_str("6M"),
            Lookback::Year => f.write_str("1Y"),
            Lookback::Bars(n) => write!(f, "{n} bars"),
        }
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_uppercase();
        match token.as_str() {
            "1W" => Ok(Lookback::Week),
            "1M" => Ok(Lookback::Month),
            "6M" => Ok(Lookback::SixMonths),
            "1Y" => Ok(Lookback::Year),
            _ => match token.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Lookback::Bars(n)),
                _ => Err(format!(
                    "invalid lookback '{}' (expected 1W, 1M, 6M, 1Y or a positive bar count)",
                    s.trim()
                )),
            },
        }
    }
}
