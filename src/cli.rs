//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::chart_svg;
use crate::adapters::csv_export;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::tcbs_adapter::TcbsAdapter;
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::config_validation::{validate_backtest_config, validate_fetch_config};
use crate::domain::error::BacktestError;
use crate::domain::ledger::AccountingConfig;
use crate::domain::session::SymbolSession;
use crate::domain::summary::LedgerSummary;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "emacross", about = "EMA-crossover backtester for TCBS price history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the crossover backtest across the configured symbols
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Backtest a single symbol instead of the configured list
        #[arg(long)]
        symbol: Option<String>,
        /// Report file path (default report.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export each fetched series as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Also render each fetched series as an SVG chart
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Fetch one symbol's price history and dump it as CSV
    Fetch {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        /// CSV output path (default <SYMBOL>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
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
            symbol,
            output,
            csv,
            chart,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            output.as_deref(),
            csv.as_deref(),
            chart.as_deref(),
        ),
        Command::Fetch {
            config,
            symbol,
            output,
        } => run_fetch(&config, &symbol, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Accounting parameters from the `[backtest]` section, defaulted like the
/// HOSE retail account the tool was written for.
pub fn build_accounting_config(config: &dyn ConfigPort) -> AccountingConfig {
    let defaults = AccountingConfig::default();
    AccountingConfig {
        initial_cash: config.get_double("backtest", "initial_cash", defaults.initial_cash),
        fee_pct: config.get_double("backtest", "fee_pct", defaults.fee_pct),
        tax_pct: config.get_double("backtest", "tax_pct", defaults.tax_pct),
        friction_pct: config.get_double("backtest", "friction_pct", defaults.friction_pct),
        lot_size: config.get_int("backtest", "lot_size", defaults.lot_size),
    }
}

pub fn resolve_symbols(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    if let Some(s) = symbol_override {
        return vec![s.to_uppercase()];
    }

    if let Some(symbols) = config.get_string("backtest", "symbols") {
        return symbols
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    if let Some(symbol) = config.get_string("backtest", "symbol") {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() {
            return vec![symbol];
        }
    }

    vec![]
}

/// Date window from config, defaulting to the trailing year.
pub fn resolve_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), BacktestError> {
    let today = chrono::Local::now().date_naive();
    let end = parse_config_date(config, "end_date")?.unwrap_or(today);
    let start =
        parse_config_date(config, "start_date")?.unwrap_or(end - chrono::Duration::days(365));
    Ok((start, end))
}

fn parse_config_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, BacktestError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map(Some).map_err(|_| {
            BacktestError::ConfigInvalid {
                section: "backtest".into(),
                key: key.into(),
                reason: "invalid date format (expected YYYY-MM-DD)".into(),
            }
        }),
    }
}

/// Derive a per-symbol file name when one path serves several symbols:
/// `out.csv` becomes `out_FPT.csv`.
fn path_for_symbol(base: &Path, symbol: &str, multi: bool) -> PathBuf {
    if !multi {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{symbol}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{symbol}"),
    };
    base.with_file_name(name)
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_path: Option<&Path>,
    csv_path: Option<&Path>,
    chart_path: Option<&Path>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_fetch_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_backtest_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let symbols = resolve_symbols(symbol_override, &config);
    if symbols.is_empty() {
        eprintln!("error: no symbols configured");
        return ExitCode::from(2);
    }

    let data_port = match TcbsAdapter::from_config(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    run_backtest_pipeline(
        &data_port,
        &config,
        &symbols,
        output_path,
        csv_path,
        chart_path,
    )
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    config: &dyn ConfigPort,
    symbols: &[String],
    output_path: Option<&Path>,
    csv_path: Option<&Path>,
    chart_path: Option<&Path>,
) -> ExitCode {
    let (start, end) = match resolve_dates(config) {
        Ok(window) => window,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let accounting = build_accounting_config(config);
    let ema_period = config.get_int("backtest", "ema_period", 20).max(1) as usize;

    eprintln!(
        "Backtesting {} symbol(s), {} to {}, EMA period {}",
        symbols.len(),
        start,
        end,
        ema_period,
    );

    let multi = symbols.len() > 1;
    let mut summaries: Vec<(String, LedgerSummary)> = Vec::with_capacity(symbols.len());

    // One symbol at a time, in list order. A failed fetch degrades that
    // symbol to an empty series instead of aborting the rest of the run.
    for symbol in symbols {
        let bars = match data_port.fetch_history(symbol, start, end) {
            Ok(bars) => bars,
            Err(e) => {
                eprintln!("warning: {symbol}: {e}");
                Vec::new()
            }
        };

        if let Some(base) = csv_path {
            let path = path_for_symbol(base, symbol, multi);
            if let Err(e) = csv_export::write_history(&bars, &path) {
                eprintln!("warning: {symbol}: csv export failed: {e}");
            }
        }
        if let Some(base) = chart_path {
            let path = path_for_symbol(base, symbol, multi);
            if let Err(e) = chart_svg::write_price_chart(symbol, &bars, &path) {
                eprintln!("warning: {symbol}: chart render failed: {e}");
            }
        }

        let session = SymbolSession::new(symbol.clone(), ema_period, accounting.clone());
        let summary = session.run(&bars);
        eprintln!(
            "  {}: {} bars, {} transactions, profit {:+.2} ({:+.2}%)",
            symbol,
            bars.len(),
            summary.transactions.len(),
            summary.total_profit,
            summary.profit_pct,
        );
        summaries.push((symbol.clone(), summary));
    }

    let output = output_path
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output_path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("report.txt"));
    let output = output.display().to_string();

    match TextReportAdapter::new().write(&summaries, &output) {
        Ok(()) => {
            eprintln!("\nReport written to: {output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write report: {e}");
            (&e).into()
        }
    }
}

fn run_fetch(config_path: &Path, symbol: &str, output_path: Option<&Path>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_fetch_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let data_port = match TcbsAdapter::from_config(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let (start, end) = match resolve_dates(&config) {
        Ok(window) => window,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let symbol = symbol.to_uppercase();
    let bars = match data_port.fetch_history(&symbol, start, end) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let output = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{symbol}.csv")));
    match csv_export::write_history(&bars, &output) {
        Ok(()) => {
            eprintln!("{} bars written to: {}", bars.len(), output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write csv: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_fetch_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_backtest_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let symbols = resolve_symbols(None, &config);
    eprintln!("  symbols: {}", symbols.join(", "));
    match resolve_dates(&config) {
        Ok((start, end)) => eprintln!("  window:  {start} to {end}"),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}
