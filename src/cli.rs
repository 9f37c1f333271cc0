//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_gateway::CsvGateway;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::catalog::Category;
use crate::domain::composer::load_instrument;
use crate::domain::config_validation::validate_config;
use crate::domain::error::{GatewayError, TickerError};
use crate::domain::price::PriceSeries;
use crate::domain::resolver::{resolve, ResolvedSymbol};
use crate::domain::settings::{GatewaySettings, GatewaySource, Settings};
use crate::domain::stats::{compute_stats_with_basis, ChangeBasis, PerformanceStats};
use crate::domain::window::{Lookback, Period};
use crate::ports::gateway_port::MarketDataGateway;

#[derive(Parser, Debug)]
#[command(name = "tickerlens", about = "Price lookup for BIST equities, gold, FX and crypto")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// How the instrument is chosen. `--query` wins over `--select`.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectorArgs {
    /// bist, metals or crypto
    #[arg(long)]
    pub category: Option<Category>,
    /// Catalog entry name
    #[arg(long)]
    pub select: Option<String>,
    /// Free-text ticker or keyword (e.g. "gold", "ASELS", "btc")
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Retrieval period: 1mo, 3mo, 6mo, 1y, 2y, 5y or max
    #[arg(long)]
    pub period: Option<Period>,
    /// Directory of <SYMBOL>.csv files (csv source)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show latest price and change over a lookback window
    Quote {
        #[command(flatten)]
        selector: SelectorArgs,
        #[command(flatten)]
        fetch: FetchArgs,
        /// 1W, 1M, 6M, 1Y or a bar count
        #[arg(long)]
        lookback: Option<Lookback>,
        /// window or previous
        #[arg(long)]
        basis: Option<ChangeBasis>,
    },
    /// Print the normalized price history as CSV
    History {
        #[command(flatten)]
        selector: SelectorArgs,
        #[command(flatten)]
        fetch: FetchArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show which symbol an input resolves to
    Resolve {
        #[command(flatten)]
        selector: SelectorArgs,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List catalog entries
    Catalog {
        #[arg(long)]
        category: Option<Category>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Quote {
            selector,
            fetch,
            lookback,
            basis,
        } => run_quote(&selector, &fetch, lookback, basis),
        Command::History {
            selector,
            fetch,
            output,
        } => run_history(&selector, &fetch, output.as_deref()),
        Command::Resolve { selector, config } => run_resolve(&selector, config.as_deref()),
        Command::Catalog { category, config } => run_catalog(category, config.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loads and validates settings. Without a path every default applies.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, TickerError> {
    let adapter = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_config(&adapter)?;
    Settings::from_config(&adapter)
}

pub fn build_gateway(settings: &GatewaySettings) -> Result<Box<dyn MarketDataGateway>, TickerError> {
    match settings.source {
        GatewaySource::Csv => {
            tracing::debug!(data_dir = %settings.data_dir.display(), "using csv gateway");
            Ok(Box::new(
                CsvGateway::new(settings.data_dir.clone()).with_header_rows(settings.header_rows),
            ))
        }
        #[cfg(feature = "yahoo")]
        GatewaySource::Yahoo => {
            use crate::adapters::yahoo_gateway::YahooGateway;
            use std::time::Duration;

            tracing::debug!(base_url = %settings.base_url, "using yahoo gateway");
            let gateway = YahooGateway::new(
                &settings.base_url,
                Duration::from_secs(settings.timeout_secs),
            )?;
            Ok(Box::new(gateway))
        }
        #[cfg(not(feature = "yahoo"))]
        GatewaySource::Yahoo => Err(TickerError::ConfigInvalid {
            section: "gateway".to_string(),
            key: "source".to_string(),
            reason: "built without the yahoo feature".to_string(),
        }),
    }
}

fn prepare(
    selector: &SelectorArgs,
    fetch: &FetchArgs,
) -> Result<(Settings, ResolvedSymbol), TickerError> {
    let mut settings = load_settings(fetch.config.as_deref())?;
    if let Some(dir) = &fetch.data_dir {
        settings.gateway.data_dir = dir.clone();
    }
    if let Some(period) = fetch.period {
        settings.display.period = period;
    }
    let resolved = resolve_selector(&settings, selector);
    tracing::info!(key = %resolved.key, name = %resolved.display_name, "resolved");
    Ok((settings, resolved))
}

pub fn resolve_selector(settings: &Settings, selector: &SelectorArgs) -> ResolvedSymbol {
    resolve(
        &settings.resolver,
        selector.select.as_deref(),
        selector.query.as_deref(),
        selector.category.unwrap_or(Category::DomesticEquity),
    )
}

/// Fetches (or composes) the series for `resolved`.
///
/// The gateway failure is logged; missing data is reported as
/// [`TickerError::NoData`] and transport failures as
/// [`TickerError::Gateway`].
pub fn load_series(
    gateway: &dyn MarketDataGateway,
    settings: &Settings,
    resolved: &ResolvedSymbol,
) -> Result<PriceSeries, TickerError> {
    let symbol = resolved.key.as_str();
    load_instrument(
        gateway,
        &resolved.key,
        settings.display.period,
        &settings.synthetic,
    )
    .map_err(|e| {
        tracing::warn!(symbol, error = %e, "fetch failed");
        match e {
            GatewayError::NoData { .. } | GatewayError::Provider { .. } => TickerError::NoData {
                symbol: symbol.to_string(),
            },
            other => TickerError::Gateway(other),
        }
    })
}

pub fn run_quote_pipeline(
    gateway: &dyn MarketDataGateway,
    settings: &Settings,
    resolved: &ResolvedSymbol,
) -> Result<String, TickerError> {
    let series = load_series(gateway, settings, resolved)?;
    let lookback = settings.display.lookback;
    let stats = compute_stats_with_basis(&series, lookback.bars(), settings.display.basis)?;
    tracing::info!(
        symbol = %resolved.key,
        bars = series.len(),
        window = stats.bars_in_window,
        "quote computed"
    );
    Ok(render_quote(resolved, &series, &stats, lookback, settings.display.basis))
}

fn run_quote(
    selector: &SelectorArgs,
    fetch: &FetchArgs,
    lookback: Option<Lookback>,
    basis: Option<ChangeBasis>,
) -> Result<(), TickerError> {
    let (mut settings, resolved) = prepare(selector, fetch)?;
    if let Some(lookback) = lookback {
        settings.display.lookback = lookback;
    }
    if let Some(basis) = basis {
        settings.display.basis = basis;
    }
    let gateway = build_gateway(&settings.gateway)?;
    let report = run_quote_pipeline(gateway.as_ref(), &settings, &resolved)?;
    print!("{report}");
    Ok(())
}

pub fn render_quote(
    resolved: &ResolvedSymbol,
    series: &PriceSeries,
    stats: &PerformanceStats,
    lookback: Lookback,
    basis: ChangeBasis,
) -> String {
    let change = match stats.percent_change {
        Some(pct) => format!("{pct:+.2}%"),
        None => "n/a".to_string(),
    };
    let as_of = series
        .last()
        .map(|bar| bar.date.to_string())
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", resolved.display_name, resolved.key));
    out.push_str(&format!("  Price:  {:.2}  (as of {as_of})\n", stats.latest_price));
    out.push_str(&format!("  Change: {change}  ({basis}, {lookback})\n"));
    out.push_str(&format!("  High:   {:.2}\n", stats.window_high));
    out.push_str(&summary_line(stats, lookback));
    out.push('\n');
    out
}

pub fn summary_line(stats: &PerformanceStats, lookback: Lookback) -> String {
    match (stats.is_up(), stats.percent_change) {
        (Some(true), Some(pct)) => {
            format!("UP: gained {pct:.1}% over {lookback}. Trend is positive.")
        }
        (Some(false), Some(pct)) => format!(
            "DOWN: lost {:.1}% over {lookback}. Selling pressure.",
            pct.abs()
        ),
        _ => format!("No change figure available over {lookback}."),
    }
}

fn run_history(
    selector: &SelectorArgs,
    fetch: &FetchArgs,
    output: Option<&Path>,
) -> Result<(), TickerError> {
    let (settings, resolved) = prepare(selector, fetch)?;
    let gateway = build_gateway(&settings.gateway)?;
    let series = load_series(gateway.as_ref(), &settings, &resolved)?;

    match output {
        Some(path) => {
            write_history(&series, File::create(path)?)?;
            eprintln!("{} bars written to {}", series.len(), path.display());
        }
        None => write_history(&series, io::stdout().lock())?,
    }
    Ok(())
}

pub fn write_history<W: Write>(series: &PriceSeries, writer: W) -> Result<(), TickerError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "open", "high", "low", "close"])
        .map_err(io::Error::from)?;
    for bar in series {
        wtr.write_record([
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
        ])
        .map_err(io::Error::from)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_resolve(selector: &SelectorArgs, config: Option<&Path>) -> Result<(), TickerError> {
    let settings = load_settings(config)?;
    let resolved = resolve_selector(&settings, selector);
    println!("{}\t{}", resolved.key, resolved.display_name);
    Ok(())
}

fn run_catalog(category: Option<Category>, config: Option<&Path>) -> Result<(), TickerError> {
    let settings = load_settings(config)?;
    print!("{}", render_catalog(&settings, category));
    Ok(())
}

pub fn render_catalog(settings: &Settings, category: Option<Category>) -> String {
    let mut out = String::new();
    for cat in Category::ALL {
        if category.is_some_and(|c| c != cat) {
            continue;
        }
        out.push_str(&format!("{cat}\n"));
        for entry in settings.resolver.catalog.in_category(cat) {
            match &entry.key {
                Some(key) => out.push_str(&format!("  {}  [{key}]\n", entry.name)),
                None => out.push_str(&format!("  {}\n", entry.name)),
            }
        }
    }
    out
}

fn run_validate(config: &Path) -> Result<(), TickerError> {
    eprintln!("Validating config: {}", config.display());
    load_settings(Some(config))?;
    eprintln!("Configuration is valid.");
    Ok(())
}
