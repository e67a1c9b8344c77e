//! CSV table adapter.

use std::fs;
use std::io;
use std::path::Path;

use crate::domain::error::DashboardError;
use crate::domain::table::{Cell, Table};
use crate::ports::table_port::{TableReader, TableWriter};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvAdapter;

impl CsvAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn read_path(&self, path: &Path) -> Result<Table, DashboardError> {
        let bytes = fs::read(path)
            .map_err(|e| io::Error::new(e.kind(), format!("failed to read {}: {}", path.display(), e)))?;
        self.read_table(&bytes)
    }
}

/// Blank headers become `Unnamed: <position>`; repeated names get a `.N`
/// suffix so every column stays addressable.
fn normalise_headers(raw: &csv::StringRecord) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());
    for (i, h) in raw.iter().enumerate() {
        let base = if h.trim().is_empty() {
            format!("Unnamed: {}", i)
        } else {
            h.trim().to_string()
        };
        let mut name = base.clone();
        let mut n = 1;
        while headers.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        headers.push(name);
    }
    headers
}

impl TableReader for CsvAdapter {
    fn read_table(&self, bytes: &[u8]) -> Result<Table, DashboardError> {
        let content = std::str::from_utf8(bytes).map_err(|e| DashboardError::Csv {
            reason: format!("file is not valid UTF-8: {}", e),
        })?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = normalise_headers(rdr.headers()?);
        if headers.is_empty() {
            return Err(DashboardError::Csv {
                reason: "missing header row".into(),
            });
        }

        let mut table = Table::new(headers);
        for (line, result) in rdr.records().enumerate() {
            let record = result?;
            if record.len() > table.width() {
                return Err(DashboardError::Csv {
                    reason: format!(
                        "row {} has {} fields, expected {}",
                        line + 1,
                        record.len(),
                        table.width()
                    ),
                });
            }
            let mut row: Vec<Cell> = record.iter().map(Cell::parse).collect();
            row.resize(table.width(), Cell::Empty);
            table.push_row(row)?;
        }

        Ok(table)
    }
}

impl TableWriter for CsvAdapter {
    fn write_table(&self, table: &Table) -> Result<Vec<u8>, DashboardError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(table.headers())?;
        for row in table.rows() {
            wtr.write_record(row.iter().map(|c| c.to_string()))?;
        }
        wtr.into_inner().map_err(|e| DashboardError::Csv {
            reason: format!("failed to flush CSV: {}", e),
        })
    }
}
