//! In-memory tabular data: headers plus rows of loosely typed cells.

use std::fmt;

use super::error::DashboardError;

/// A single table cell. Values are typed at parse time; nothing enforces
/// a column-wide type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Parse raw text: blank is `Empty`, anything `f64` accepts is a
    /// `Number`, the rest is `Text`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    /// Numeric coercion. Text and empty cells have no numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) if v.is_nan() => Ok(()),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table, rejecting rows whose width differs from the header.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, DashboardError> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != headers.len())
        {
            return Err(DashboardError::invalid(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                headers.len()
            )));
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, DashboardError> {
        self.column_index(name)
            .ok_or_else(|| DashboardError::missing_column(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell>, DashboardError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Numeric view of a column; cells without a numeric value become NaN.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, DashboardError> {
        Ok(self
            .column(name)?
            .map(|c| c.as_f64().unwrap_or(f64::NAN))
            .collect())
    }

    /// Keep only the named columns, in the order given.
    pub fn project(&self, names: &[&str]) -> Result<Table, DashboardError> {
        let indices = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<Result<Vec<_>, _>>()?;

        let headers = names.iter().map(|n| n.to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(Table { headers, rows })
    }

    /// Remove the named columns; names that are not present are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Table {
        let keep: Vec<usize> = (0..self.headers.len())
            .filter(|&i| !names.contains(&self.headers[i].as_str()))
            .collect();

        Table {
            headers: keep.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        }
    }

    pub fn filter_rows<F>(&self, mut predicate: F) -> Table
    where
        F: FnMut(&[Cell]) -> bool,
    {
        Table {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), DashboardError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(DashboardError::invalid("column name must not be empty"));
        }
        let idx = self.require_column(from)?;
        if from != to && self.has_column(to) {
            return Err(DashboardError::invalid(format!(
                "column '{}' already exists",
                to
            )));
        }
        self.headers[idx] = to.to_string();
        Ok(())
    }

    /// Append an empty column.
    pub fn add_column(&mut self, name: &str) -> Result<(), DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::invalid("column name must not be empty"));
        }
        if self.has_column(name) {
            return Err(DashboardError::invalid(format!(
                "column '{}' already exists",
                name
            )));
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(Cell::Empty);
        }
        Ok(())
    }

    /// Append a row of empty cells and return its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(vec![Cell::Empty; self.headers.len()]);
        self.rows.len() - 1
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), DashboardError> {
        if row.len() != self.headers.len() {
            return Err(DashboardError::invalid(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Overwrite a cell with a value parsed from raw text.
    pub fn set_cell(&mut self, row: usize, col: usize, raw: &str) -> Result<(), DashboardError> {
        let rows = self.rows.len();
        if col >= self.headers.len() {
            return Err(DashboardError::invalid(format!(
                "column {} out of range (table has {} columns)",
                col,
                self.headers.len()
            )));
        }
        let target = self
            .rows
            .get_mut(row)
            .ok_or(DashboardError::RowOutOfRange { row, rows })?;
        target[col] = Cell::parse(raw);
        Ok(())
    }

    pub fn delete_row(&mut self, row: usize) -> Result<Vec<Cell>, DashboardError> {
        if row >= self.rows.len() {
            return Err(DashboardError::RowOutOfRange {
                row,
                rows: self.rows.len(),
            });
        }
        Ok(self.rows.remove(row))
    }

    /// Rows `range` as display strings, for rendering.
    pub fn display_rows(&self, range: std::ops::Range<usize>) -> Vec<Vec<String>> {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        self.rows[start..end]
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }
}

/// A window onto a paged table. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub pages: usize,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// Clamp `page` into range and compute the row window. An empty table has
/// one (empty) page.
pub fn paginate(len: usize, page: usize, page_size: usize) -> PageWindow {
    let page_size = page_size.max(1);
    let pages = len.div_ceil(page_size).max(1);
    let page = page.clamp(1, pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(len);
    PageWindow {
        page,
        pages,
        start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["Date".into(), "A".into(), "B".into()],
            vec![
                vec![Cell::from("2020-01-01"), Cell::Number(1.0), Cell::Number(10.0)],
                vec![Cell::from("2020-01-02"), Cell::Number(2.0), Cell::from("n/a")],
                vec![Cell::from("2020-01-03"), Cell::Empty, Cell::Number(30.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn cell_parse_classifies_values() {
        assert_eq!(Cell::parse("  "), Cell::Empty);
        assert_eq!(Cell::parse("1.5"), Cell::Number(1.5));
        assert_eq!(Cell::parse(" -2 "), Cell::Number(-2.0));
        assert_eq!(Cell::parse("2020-01-01"), Cell::Text("2020-01-01".into()));
    }

    #[test]
    fn cell_display_hides_missing_values() {
        assert_eq!(Cell::Empty.to_string(), "");
        assert_eq!(Cell::Number(f64::NAN).to_string(), "");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Number(3.0).to_string(), "3");
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let result = Table::from_rows(
            vec!["A".into(), "B".into()],
            vec![vec![Cell::Number(1.0)]],
        );
        assert!(matches!(result, Err(DashboardError::InvalidInput { .. })));
    }

    #[test]
    fn numeric_column_coerces_to_nan() {
        let t = sample();
        let b = t.numeric_column("B").unwrap();
        assert_eq!(b[0], 10.0);
        assert!(b[1].is_nan());
        assert_eq!(b[2], 30.0);

        let a = t.numeric_column("A").unwrap();
        assert!(a[2].is_nan());
    }

    #[test]
    fn missing_column_is_reported() {
        let t = sample();
        let err = t.numeric_column("C").unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn { column } if column == "C"));
    }

    #[test]
    fn project_reorders_columns() {
        let t = sample().project(&["B", "Date"]).unwrap();
        assert_eq!(t.headers(), &["B".to_string(), "Date".to_string()]);
        assert_eq!(t.rows()[0][0], Cell::Number(10.0));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn drop_columns_ignores_absent_names() {
        let t = sample().drop_columns(&["A", "Unnamed: 0"]);
        assert_eq!(t.headers(), &["Date".to_string(), "B".to_string()]);
        assert_eq!(t.rows()[1].len(), 2);
    }

    #[test]
    fn filter_rows_keeps_matching() {
        let t = sample().filter_rows(|r| r[1].as_f64().is_some());
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn add_column_pads_rows() {
        let mut t = sample();
        t.add_column("Notes").unwrap();
        assert_eq!(t.width(), 4);
        assert!(t.rows().iter().all(|r| r[3] == Cell::Empty));
    }

    #[test]
    fn add_column_rejects_blank_and_duplicate() {
        let mut t = sample();
        assert!(t.add_column("   ").is_err());
        assert!(t.add_column("A").is_err());
        assert_eq!(t.width(), 3);
    }

    #[test]
    fn add_row_appends_empty_cells() {
        let mut t = sample();
        let idx = t.add_row();
        assert_eq!(idx, 3);
        assert!(t.rows()[3].iter().all(Cell::is_empty));
    }

    #[test]
    fn set_cell_parses_value() {
        let mut t = sample();
        t.set_cell(2, 1, "4.25").unwrap();
        assert_eq!(t.cell(2, 1), Some(&Cell::Number(4.25)));

        assert!(matches!(
            t.set_cell(9, 1, "1"),
            Err(DashboardError::RowOutOfRange { row: 9, rows: 3 })
        ));
        assert!(t.set_cell(0, 9, "1").is_err());
    }

    #[test]
    fn delete_row_removes_and_returns() {
        let mut t = sample();
        let removed = t.delete_row(0).unwrap();
        assert_eq!(removed[0], Cell::from("2020-01-01"));
        assert_eq!(t.len(), 2);
        assert!(t.delete_row(5).is_err());
    }

    #[test]
    fn rename_column_checks_collisions() {
        let mut t = sample();
        t.rename_column("A", "Alpha").unwrap();
        assert!(t.has_column("Alpha"));
        assert!(t.rename_column("Alpha", "B").is_err());
        assert!(t.rename_column("Missing", "X").is_err());
    }

    #[test]
    fn paginate_clamps_pages() {
        let w = paginate(25, 1, 10);
        assert_eq!((w.page, w.pages, w.start, w.end), (1, 3, 0, 10));
        assert!(!w.has_prev());
        assert!(w.has_next());

        let w = paginate(25, 3, 10);
        assert_eq!((w.start, w.end), (20, 25));

        let w = paginate(25, 99, 10);
        assert_eq!(w.page, 3);

        let w = paginate(0, 0, 10);
        assert_eq!((w.page, w.pages, w.start, w.end), (1, 1, 0, 0));
    }

    #[test]
    fn display_rows_clamps_range() {
        let t = sample();
        let rows = t.display_rows(1..10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], "n/a");
        assert_eq!(rows[1][1], "");
    }
}
