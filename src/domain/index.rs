//! Stock-index catalog and column naming conventions.
//!
//! Uploaded tables carry one `<Index> Adj Close` and one `<Index> Returns`
//! column per benchmark.

use super::table::Table;

pub const ADJ_CLOSE_SUFFIX: &str = " Adj Close";
pub const RETURNS_SUFFIX: &str = " Returns";

/// Benchmarks the dashboard knows by name, in display order.
pub const KNOWN_INDICES: [&str; 6] = [
    "Nifty 50",
    "Dow Jones Index",
    "Nasdaq",
    "Hang Seng",
    "Nikkei 225",
    "DAX",
];

pub const DEFAULT_SUMMARY_INDEX: &str = "Nifty 50 Returns";
pub const DEFAULT_CORRELATION: [&str; 2] = ["Nifty 50 Returns", "DAX Returns"];
pub const DEFAULT_PRICE_COLUMNS: [&str; 4] = [
    "Nifty 50 Adj Close",
    "Dow Jones Index Adj Close",
    "Nasdaq Adj Close",
    "Hang Seng Adj Close",
];

/// A selectable returns series: human label plus the column it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOption {
    pub label: String,
    pub column: String,
}

/// `X Adj Close` -> `X Returns`; any other name gets the suffix appended.
pub fn returns_column_for(price_column: &str) -> String {
    let base = price_column
        .strip_suffix(ADJ_CLOSE_SUFFIX)
        .unwrap_or(price_column);
    format!("{}{}", base, RETURNS_SUFFIX)
}

pub fn label_for(returns_column: &str) -> &str {
    returns_column
        .strip_suffix(RETURNS_SUFFIX)
        .unwrap_or(returns_column)
}

/// Returns columns present in the table: known indices first, then any
/// other `* Returns` header in table order.
pub fn returns_columns(table: &Table) -> Vec<IndexOption> {
    let mut options: Vec<IndexOption> = KNOWN_INDICES
        .iter()
        .map(|name| format!("{}{}", name, RETURNS_SUFFIX))
        .filter(|col| table.has_column(col))
        .map(|column| IndexOption {
            label: label_for(&column).to_string(),
            column,
        })
        .collect();

    for header in table.headers() {
        if header.ends_with(RETURNS_SUFFIX) && !options.iter().any(|o| &o.column == header) {
            options.push(IndexOption {
                label: label_for(header).to_string(),
                column: header.clone(),
            });
        }
    }
    options
}

/// The preferred column if present, else the first returns column.
pub fn default_returns_column(table: &Table, preferred: &str) -> Option<String> {
    if table.has_column(preferred) {
        return Some(preferred.to_string());
    }
    returns_columns(table).into_iter().next().map(|o| o.column)
}
