//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export::CsvExporter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::output_files::{self, ExportTarget};
use crate::adapters::ticker_file_adapter::TickerFileAdapter;
use crate::adapters::xlsx_export::XlsxExporter;
use crate::domain::candidate::{self, CandidateRow};
use crate::domain::config_validation::{
    DEFAULT_SALES_GROWTH_PCT, validate_config, validate_thresholds,
};
use crate::domain::error::TurnscreenError;
use crate::domain::screen::{ScreenOutcome, run_screen};
use crate::domain::thresholds::Thresholds;
use crate::domain::universe::{normalize_tickers, parse_tickers};
use crate::logging::init_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::FinancialDataPort;
use crate::ports::screener_port::ScreenerPort;

pub const DEFAULT_CSV_PATH: &str = "high_growth_turnaround_us_stocks.csv";
pub const DEFAULT_XLSX_PATH: &str = "high_growth_turnaround_us_stocks.xlsx";

#[derive(Parser, Debug)]
#[command(name = "turnscreen", about = "High-growth turnaround stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen, filter and write the CSV and XLSX outputs
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for the output files, overriding the configured locations
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Comma-separated tickers to evaluate instead of querying the screener
        #[arg(long)]
        tickers: Option<String>,
    },
    /// Print the tickers returned by the screener
    Screen {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show figures, derived metrics and threshold verdicts for one ticker
    Inspect {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            output_dir,
            tickers,
        } => run_screen_command(&config, output_dir.as_deref(), tickers.as_deref()),
        Command::Screen { config } => run_list_tickers(&config),
        Command::Inspect { config, ticker } => run_inspect(&config, &ticker),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path)
        .map(FileConfigAdapter::with_env_overrides)
        .map_err(|e| {
            let err = TurnscreenError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            };
            eprintln!("error: {err}");
            ExitCode::from(&err)
        })
}

/// Load, set up logging from `[logging]`, and validate.
fn prepare(config_path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = load_config(config_path)?;
    init_logging(
        &adapter
            .get_string("logging", "level")
            .unwrap_or_else(|| "info".to_string()),
        &adapter
            .get_string("logging", "format")
            .unwrap_or_else(|| "pretty".to_string()),
        adapter.get_bool("logging", "ansi", true),
    );
    info!(config = %config_path.display(), "loaded config");

    validate_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

fn fail(err: &TurnscreenError) -> ExitCode {
    if err.is_per_ticker() {
        warn!("{err}");
    } else {
        error!("{err}");
    }
    err.into()
}

pub fn build_thresholds(config: &dyn ConfigPort) -> Result<Thresholds, TurnscreenError> {
    validate_thresholds(config)?;
    let defaults = Thresholds::default();
    Ok(Thresholds {
        min_revenue_cagr: config.get_double("thresholds", "min_revenue_cagr", defaults.min_revenue_cagr),
        min_market_cap: config.get_double("thresholds", "min_market_cap", defaults.min_market_cap),
        max_market_cap: config.get_double("thresholds", "max_market_cap", defaults.max_market_cap),
        max_breakeven_loss: config.get_double(
            "thresholds",
            "max_breakeven_loss",
            defaults.max_breakeven_loss,
        ),
    })
}

pub fn sales_growth_pct(config: &dyn ConfigPort) -> u32 {
    let pct = config.get_int("screener", "min_sales_growth_pct", DEFAULT_SALES_GROWTH_PCT);
    u32::try_from(pct).unwrap_or(DEFAULT_SALES_GROWTH_PCT as u32)
}

fn data_dir(config: &dyn ConfigPort, section: &str) -> Option<PathBuf> {
    config
        .get_string(section, "data_dir")
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
}

pub fn build_screener(config: &dyn ConfigPort) -> Result<Box<dyn ScreenerPort>, TurnscreenError> {
    let source = config
        .get_string("screener", "source")
        .unwrap_or_else(|| "finviz".to_string());

    match source.as_str() {
        "file" => {
            let path = config.get_string("screener", "path").ok_or_else(|| {
                TurnscreenError::ConfigMissing {
                    section: "screener".into(),
                    key: "path".into(),
                }
            })?;
            Ok(Box::new(TickerFileAdapter::new(PathBuf::from(path))))
        }
        "csv" => {
            let dir = data_dir(config, "screener")
                .or_else(|| data_dir(config, "financials"))
                .ok_or_else(|| TurnscreenError::ConfigMissing {
                    section: "screener".into(),
                    key: "data_dir".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(dir)))
        }
        "finviz" => build_finviz(config),
        other => Err(TurnscreenError::ConfigInvalid {
            section: "screener".into(),
            key: "source".into(),
            reason: format!("unknown source '{}'", other),
        }),
    }
}

#[cfg(feature = "http")]
fn build_finviz(config: &dyn ConfigPort) -> Result<Box<dyn ScreenerPort>, TurnscreenError> {
    use crate::adapters::finviz_adapter::FinvizAdapter;
    Ok(Box::new(FinvizAdapter::from_config(config)?))
}

#[cfg(not(feature = "http"))]
fn build_finviz(_config: &dyn ConfigPort) -> Result<Box<dyn ScreenerPort>, TurnscreenError> {
    Err(TurnscreenError::ConfigInvalid {
        section: "screener".into(),
        key: "source".into(),
        reason: "http feature is required for finviz".into(),
    })
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<Box<dyn FinancialDataPort>, TurnscreenError> {
    let source = config
        .get_string("financials", "source")
        .unwrap_or_else(|| "yahoo".to_string());

    match source.as_str() {
        "csv" => {
            let dir = data_dir(config, "financials").ok_or_else(|| TurnscreenError::ConfigMissing {
                section: "financials".into(),
                key: "data_dir".into(),
            })?;
            Ok(Box::new(CsvAdapter::new(dir)))
        }
        "yahoo" => build_yahoo(config),
        other => Err(TurnscreenError::ConfigInvalid {
            section: "financials".into(),
            key: "source".into(),
            reason: format!("unknown source '{}'", other),
        }),
    }
}

#[cfg(feature = "http")]
fn build_yahoo(config: &dyn ConfigPort) -> Result<Box<dyn FinancialDataPort>, TurnscreenError> {
    use crate::adapters::yahoo_adapter::YahooAdapter;
    Ok(Box::new(YahooAdapter::from_config(config)?))
}

#[cfg(not(feature = "http"))]
fn build_yahoo(_config: &dyn ConfigPort) -> Result<Box<dyn FinancialDataPort>, TurnscreenError> {
    Err(TurnscreenError::ConfigInvalid {
        section: "financials".into(),
        key: "source".into(),
        reason: "http feature is required for yahoo".into(),
    })
}

/// Configured output locations. With `output_dir`, only the file names are
/// kept and placed in that directory.
pub fn output_paths(config: &dyn ConfigPort, output_dir: Option<&Path>) -> (PathBuf, PathBuf) {
    let resolve = |key: &str, default: &str| {
        let configured = PathBuf::from(
            config
                .get_string("output", key)
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| default.to_string()),
        );
        match output_dir {
            Some(dir) => dir.join(configured.file_name().unwrap_or(OsStr::new(default))),
            None => configured,
        }
    };
    (
        resolve("csv_path", DEFAULT_CSV_PATH),
        resolve("xlsx_path", DEFAULT_XLSX_PATH),
    )
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: ScreenOutcome,
    pub written: Vec<PathBuf>,
}

/// Screener → fetch/filter → publish. A screener failure returns before any
/// output is touched.
pub fn run_screen_pipeline(
    screener: &dyn ScreenerPort,
    data_port: &dyn FinancialDataPort,
    thresholds: &Thresholds,
    min_sales_growth_pct: u32,
    ticker_override: Option<Vec<String>>,
    csv_path: &Path,
    xlsx_path: &Path,
) -> Result<RunReport, TurnscreenError> {
    let tickers = match ticker_override {
        Some(tickers) => {
            info!(count = tickers.len(), "using tickers from the command line");
            tickers
        }
        None => {
            let raw = screener.screen(min_sales_growth_pct)?;
            normalize_tickers(raw)
        }
    };

    if tickers.is_empty() {
        warn!("screener returned no tickers");
    }
    info!(count = tickers.len(), "evaluating tickers");

    let outcome = run_screen(data_port, &tickers, thresholds);

    let written = output_files::publish(
        &outcome.candidates,
        &[
            ExportTarget {
                exporter: &CsvExporter,
                path: csv_path.to_path_buf(),
            },
            ExportTarget {
                exporter: &XlsxExporter,
                path: xlsx_path.to_path_buf(),
            },
        ],
    )?;

    info!(
        "Saved {} tickers on {}",
        outcome.candidates.len(),
        Utc::now().format("%Y-%m-%d")
    );

    Ok(RunReport { outcome, written })
}

fn run_screen_command(
    config_path: &Path,
    output_dir: Option<&Path>,
    tickers: Option<&str>,
) -> ExitCode {
    let adapter = match prepare(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let ticker_override = match tickers.map(parse_tickers).transpose() {
        Ok(t) => t,
        Err(e) => {
            error!("invalid --tickers: {e}");
            return ExitCode::from(2);
        }
    };

    let thresholds = match build_thresholds(&adapter) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    let screener = match build_screener(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let data_port = match build_data_port(&adapter) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let (csv_path, xlsx_path) = output_paths(&adapter, output_dir);

    match run_screen_pipeline(
        screener.as_ref(),
        data_port.as_ref(),
        &thresholds,
        sales_growth_pct(&adapter),
        ticker_override,
        &csv_path,
        &xlsx_path,
    ) {
        Ok(report) => {
            if !report.outcome.skipped.is_empty() {
                let skipped: Vec<&str> = report
                    .outcome
                    .skipped
                    .iter()
                    .map(|s| s.ticker.as_str())
                    .collect();
                info!(?skipped, "tickers without usable data");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list_tickers(config_path: &Path) -> ExitCode {
    let adapter = match prepare(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let screener = match build_screener(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    match screener.screen(sales_growth_pct(&adapter)) {
        Ok(raw) => {
            let tickers = normalize_tickers(raw);
            for ticker in &tickers {
                println!("{}", ticker);
            }
            info!(count = tickers.len(), "tickers listed");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn format_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "undefined".to_string())
}

fn verdict(ok: bool) -> &'static str {
    if ok { "pass" } else { "FAIL" }
}

/// Human-readable breakdown printed by `inspect`.
pub fn render_inspection(row: &CandidateRow, thresholds: &Thresholds) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", row.ticker));
    out.push_str(&format!(
        "  {:>6}  {:>18}  {:>18}\n",
        "year", "revenue", "net_income"
    ));
    for year in &row.window.years {
        out.push_str(&format!(
            "  {:>6}  {:>18.0}  {:>18.0}\n",
            year.year, year.revenue, year.net_income
        ));
    }
    out.push_str(&format!(
        "  revenue CAGR:     {:>10}  (min {}) [{}]\n",
        format_pct(row.cagr),
        format_pct(Some(thresholds.min_revenue_cagr)),
        verdict(row.cagr_ok)
    ));
    out.push_str(&format!(
        "  market cap:       {:>10.0}  ({:.0} - {:.0}) [{}]\n",
        row.market_cap,
        thresholds.min_market_cap,
        thresholds.max_market_cap,
        verdict(row.market_cap_ok)
    ));
    out.push_str(&format!(
        "  latest net income:{:>10.0}  (loss up to {:.0}) [{}]\n",
        row.net_income,
        thresholds.max_breakeven_loss,
        verdict(row.turnaround_ok)
    ));
    out.push_str(&format!(
        "  net income CAGR:  {:>10}\n",
        format_pct(row.net_income_cagr)
    ));
    out.push_str(&format!(
        "  loss to profit:   {:>10}\n",
        if row.sign_change { "yes" } else { "no" }
    ));
    let latest = row.window.latest();
    let amount = |v: Option<f64>| {
        v.map(|v| format!("{:.0}", v))
            .unwrap_or_else(|| "n/a".to_string())
    };
    out.push_str(&format!(
        "  operating cash flow ({}): {}\n",
        latest.year,
        amount(latest.operating_cash_flow)
    ));
    out.push_str(&format!(
        "  debt/equity ({}): {}\n",
        latest.year,
        latest
            .debt_to_equity()
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "n/a".to_string())
    ));
    out.push_str(&format!(
        "  verdict: {}\n",
        if row.passes() { "INCLUDED" } else { "excluded" }
    ));
    out
}

fn run_inspect(config_path: &Path, ticker: &str) -> ExitCode {
    let adapter = match prepare(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let thresholds = match build_thresholds(&adapter) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    let data_port = match build_data_port(&adapter) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let ticker = match parse_tickers(ticker).as_deref() {
        Ok([single]) => single.clone(),
        Ok(_) => {
            error!("inspect takes exactly one ticker");
            return ExitCode::from(2);
        }
        Err(e) => {
            error!("invalid --ticker: {e}");
            return ExitCode::from(2);
        }
    };
    let row = data_port
        .fetch_financials(&ticker)
        .and_then(|record| candidate::evaluate(&record, &thresholds));

    match row {
        Ok(row) => {
            print!("{}", render_inspection(&row, &thresholds));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match prepare(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let thresholds = match build_thresholds(&adapter) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    let (csv_path, xlsx_path) = output_paths(&adapter, None);

    println!(
        "screener:   {} (sales growth > {}%)",
        adapter
            .get_string("screener", "source")
            .unwrap_or_else(|| "finviz".to_string()),
        sales_growth_pct(&adapter)
    );
    println!(
        "financials: {}",
        adapter
            .get_string("financials", "source")
            .unwrap_or_else(|| "yahoo".to_string())
    );
    println!(
        "thresholds: CAGR >= {}, market cap {:.0} - {:.0}, loss <= {:.0}",
        format_pct(Some(thresholds.min_revenue_cagr)),
        thresholds.min_market_cap,
        thresholds.max_market_cap,
        thresholds.max_breakeven_loss
    );
    println!("outputs:    {} , {}", csv_path.display(), xlsx_path.display());
    println!("Configuration is valid.");
    ExitCode::SUCCESS
}
