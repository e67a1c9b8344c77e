//! Derived views recomputed from the uploaded table on every request.

use chrono::NaiveDate;

use super::dataset::{DATE_COLUMN, Dataset, UNNAMED_INDEX_COLUMN, YEAR_COLUMN};
use super::error::DashboardError;
use super::index::returns_column_for;
use super::stats::{BoxStats, CorrelationMatrix, Describe, ReturnSplit, describe, returns_pct};
use super::table::{Cell, Table};

const SUMMARY_DECIMALS: u32 = 2;

/// Statistics for one returns column within one year.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub index_column: String,
    pub year: i32,
    pub describe: Describe,
    pub box_stats: Option<BoxStats>,
    pub split: ReturnSplit,
}

impl SummaryView {
    pub fn title(&self) -> String {
        format!("{} ({})", self.index_column, self.year)
    }

    pub fn pie_title(&self) -> String {
        format!(
            "Percentage Positive and Negative {} ({})",
            self.index_column, self.year
        )
    }
}

pub fn summary_view(
    dataset: &Dataset,
    index_column: &str,
    year: i32,
) -> Result<SummaryView, DashboardError> {
    let rows = dataset.rows_for_year(year);
    let values = rows.numeric_column(index_column)?;

    Ok(SummaryView {
        index_column: index_column.to_string(),
        year,
        describe: describe(&values).rounded(SUMMARY_DECIMALS),
        box_stats: BoxStats::compute(&values),
        split: ReturnSplit::count(&values),
    })
}

/// Correlation across the selected returns columns. At least two are
/// required for the matrix to say anything.
pub fn correlation_view(
    dataset: &Dataset,
    columns: &[&str],
) -> Result<CorrelationMatrix, DashboardError> {
    if columns.len() < 2 {
        return Err(DashboardError::invalid("select at least 2 indices"));
    }
    CorrelationMatrix::compute(&dataset.table, columns)
}

/// Closing prices within a date range and the returns derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub prices: Table,
    pub returns: Table,
}

impl PriceView {
    /// Overwrite one price cell and recompute the returns table.
    pub fn edit_price(&mut self, row: usize, col: usize, raw: &str) -> Result<(), DashboardError> {
        if self.prices.headers().get(col).map(String::as_str) == Some(DATE_COLUMN) {
            return Err(DashboardError::invalid("the Date column is not editable"));
        }
        self.prices.set_cell(row, col, raw)?;
        self.returns = returns_table(&self.prices)?;
        Ok(())
    }
}

/// Select `Date` plus whichever of `price_columns` exist, restricted to
/// `[start, end]`.
pub fn price_view(
    dataset: &Dataset,
    price_columns: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceView, DashboardError> {
    dataset.table.require_column(DATE_COLUMN)?;

    let present: Vec<&str> = price_columns
        .iter()
        .map(String::as_str)
        .filter(|c| dataset.table.has_column(c))
        .collect();
    if present.is_empty() {
        let wanted = price_columns
            .first()
            .cloned()
            .unwrap_or_else(|| "price columns".to_string());
        return Err(DashboardError::missing_column(wanted));
    }

    let mut selected = vec![DATE_COLUMN];
    selected.extend(present);

    let prices = dataset.rows_between(start, end).project(&selected)?;
    let returns = returns_table(&prices)?;
    Ok(PriceView {
        start,
        end,
        prices,
        returns,
    })
}

/// Percentage returns of every non-date column, renamed `<Index> Returns`.
/// A leading `Date` column is carried through unchanged.
pub fn returns_table(prices: &Table) -> Result<Table, DashboardError> {
    let date_idx = prices.column_index(DATE_COLUMN);

    let value_columns: Vec<&String> = prices
        .headers()
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != date_idx)
        .map(|(_, h)| h)
        .collect();

    let series = value_columns
        .iter()
        .map(|h| prices.numeric_column(h).map(|v| returns_pct(&v)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut headers = Vec::with_capacity(value_columns.len() + 1);
    if date_idx.is_some() {
        headers.push(DATE_COLUMN.to_string());
    }
    headers.extend(value_columns.iter().map(|h| returns_column_for(h)));

    let rows = (0..prices.len())
        .map(|i| {
            let mut row = Vec::with_capacity(headers.len());
            if let Some(d) = date_idx {
                row.push(prices.rows()[i][d].clone());
            }
            row.extend(series.iter().map(|s| Cell::Number(s[i])));
            row
        })
        .collect();

    Table::from_rows(headers, rows)
}

/// Initial spreadsheet contents: the upload minus its row-index and `Year`
/// columns.
pub fn editor_sheet(dataset: &Dataset) -> Table {
    dataset
        .table
        .drop_columns(&[UNNAMED_INDEX_COLUMN, YEAR_COLUMN])
}

/// Columns shown in the upload preview: skip the row-index column and cap
/// the width at twelve.
pub fn snippet_columns(table: &Table) -> Vec<&str> {
    const SNIPPET_WIDTH: usize = 12;
    table
        .headers()
        .iter()
        .skip(1)
        .take(SNIPPET_WIDTH)
        .map(String::as_str)
        .collect()
}
