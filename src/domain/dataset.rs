//! The uploaded dataset and its date/year filters.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::table::{Cell, Table};

pub const DATE_COLUMN: &str = "Date";
pub const YEAR_COLUMN: &str = "Year";
pub const UNNAMED_INDEX_COLUMN: &str = "Unnamed: 0";

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse the date forms found in exported index data. A trailing time part
/// is accepted and dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
}

fn cell_date(cell: &Cell) -> Option<NaiveDate> {
    cell.as_text().and_then(parse_date)
}

fn cell_year(cell: &Cell) -> Option<i32> {
    cell.as_f64()
        .filter(|v| v.fract() == 0.0)
        .map(|v| v as i32)
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub table: Table,
}

impl Dataset {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    /// Year of each row, from `Year` when present, otherwise from `Date`.
    fn row_years(&self) -> Vec<Option<i32>> {
        if let Some(idx) = self.table.column_index(YEAR_COLUMN) {
            return self.table.rows().iter().map(|r| cell_year(&r[idx])).collect();
        }
        match self.table.column_index(DATE_COLUMN) {
            Some(idx) => self
                .table
                .rows()
                .iter()
                .map(|r| cell_date(&r[idx]).map(|d| d.year()))
                .collect(),
            None => vec![None; self.table.len()],
        }
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.row_years().into_iter().flatten().collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn rows_for_year(&self, year: i32) -> Table {
        let years = self.row_years();
        let mut i = 0;
        self.table.filter_rows(|_| {
            let keep = years[i] == Some(year);
            i += 1;
            keep
        })
    }

    /// Rows dated within `[start, end]`. Rows without a readable date are
    /// dropped.
    pub fn rows_between(&self, start: NaiveDate, end: NaiveDate) -> Table {
        match self.table.column_index(DATE_COLUMN) {
            Some(idx) => self.table.filter_rows(|r| {
                cell_date(&r[idx]).is_some_and(|d| d >= start && d <= end)
            }),
            None => self.table.filter_rows(|_| false),
        }
    }

    /// First and last date in the table, if any row has one.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let idx = self.table.column_index(DATE_COLUMN)?;
        let dates = self.table.rows().iter().filter_map(|r| cell_date(&r[idx]));
        dates.fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
    }
}
