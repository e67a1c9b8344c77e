//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::chart_svg::format_correlation;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::{DashboardConfig, build_dashboard_config};
use crate::domain::dataset::Dataset;
use crate::domain::error::DashboardError;
use crate::domain::index::{DEFAULT_SUMMARY_INDEX, default_returns_column};
use crate::domain::views::{correlation_view, price_view, summary_view};
use crate::ports::table_port::TableWriter;

#[derive(Parser, Debug)]
#[command(name = "indexdash", about = "Stock index returns dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web dashboard
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// CSV to load before accepting requests
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Print summary statistics for one index and year
    Describe {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long)]
        index: Option<String>,
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Print the correlation matrix of returns columns
    Correlate {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long, value_delimiter = ',', required = true)]
        indices: Vec<String>,
    },
    /// Print daily returns within a date range as CSV
    Returns {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Serve { config, data } => run_serve(config.as_deref(), data.as_deref()),
        Command::Describe { file, index, year } => load_dataset(&file)
            .and_then(|ds| describe_report(&ds, index.as_deref(), year))
            .map(|report| print!("{report}")),
        Command::Correlate { file, indices } => load_dataset(&file)
            .and_then(|ds| correlate_report(&ds, &indices))
            .map(|report| print!("{report}")),
        Command::Returns { file, start, end } => load_dataset(&file)
            .and_then(|ds| returns_csv(&ds, &DashboardConfig::default().price_columns, start, end))
            .and_then(|bytes| std::io::stdout().write_all(&bytes).map_err(DashboardError::from)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Read and validate the INI at `path`; no path means all defaults.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, DashboardError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = FileConfigAdapter::from_file(path)?;
            build_dashboard_config(&adapter)
        }
        None => Ok(DashboardConfig::default()),
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset, DashboardError> {
    let table = CsvAdapter::new().read_path(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    eprintln!("Loaded {} ({} rows, {} columns)", name, table.len(), table.width());
    Ok(Dataset::new(name, table))
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

/// Summary statistics as aligned text. Defaults: `Nifty 50 Returns` (or the
/// first returns column) and the earliest year.
pub fn describe_report(
    dataset: &Dataset,
    index: Option<&str>,
    year: Option<i32>,
) -> Result<String, DashboardError> {
    let index = match index {
        Some(index) => index.to_string(),
        None => default_returns_column(&dataset.table, DEFAULT_SUMMARY_INDEX)
            .ok_or_else(|| DashboardError::missing_column(DEFAULT_SUMMARY_INDEX))?,
    };
    let year = match year {
        Some(year) => year,
        None => *dataset
            .years()
            .first()
            .ok_or_else(|| DashboardError::invalid("dataset has no Year or Date values"))?,
    };

    let view = summary_view(dataset, &index, year)?;
    let mut out = String::new();
    out.push_str(&format!("{}\n", view.title()));
    for (label, value) in view.describe.rows() {
        out.push_str(&format!("{:<8}{:>14}\n", label, format_value(value)));
    }
    out.push_str(&format!(
        "positive {:.2}%  negative {:.2}%\n",
        view.split.positive_pct(),
        view.split.negative_pct()
    ));
    Ok(out)
}

/// Correlation matrix as tab-separated text with a header row.
pub fn correlate_report(dataset: &Dataset, indices: &[String]) -> Result<String, DashboardError> {
    let columns: Vec<&str> = indices.iter().map(|s| s.trim()).collect();
    let matrix = correlation_view(dataset, &columns)?;

    let mut out = String::new();
    out.push_str(&format!("\t{}\n", matrix.labels.join("\t")));
    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
        let cells: Vec<String> = row.iter().map(|&v| format_correlation(v)).collect();
        out.push_str(&format!("{}\t{}\n", label, cells.join("\t")));
    }
    Ok(out)
}

pub fn returns_csv(
    dataset: &Dataset,
    price_columns: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<u8>, DashboardError> {
    let view = price_view(dataset, price_columns, start, end)?;
    CsvAdapter::new().write_table(&view.returns)
}

#[cfg(feature = "web")]
fn run_serve(config_path: Option<&Path>, data_path: Option<&Path>) -> Result<(), DashboardError> {
    use crate::adapters::web::{AppState, build_router, init_tracing};
    use crate::domain::workspace::Workspace;
    use std::sync::Arc;

    init_tracing();
    let config = load_config(config_path)?;

    let workspace = Arc::new(Workspace::new());
    if let Some(path) = data_path.or(config.preload.as_deref()) {
        workspace.replace(load_dataset(path)?);
    }

    let addr = config.listen;
    let adapter = Arc::new(CsvAdapter::new());
    let state = AppState {
        workspace,
        reader: adapter.clone(),
        writer: adapter,
        config,
    };
    let router = build_router(state);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "dashboard listening");
        eprintln!("Starting web server on http://{}", addr);
        axum::serve(listener, router).await
    })?;
    Ok(())
}

#[cfg(not(feature = "web"))]
fn run_serve(config_path: Option<&Path>, data_path: Option<&Path>) -> Result<(), DashboardError> {
    let _ = (config_path, data_path);
    Err(DashboardError::invalid("web feature is required for serve"))
}
