//! Table import/export port traits.

use crate::domain::error::DashboardError;
use crate::domain::table::Table;

/// Decodes uploaded bytes into a table.
pub trait TableReader {
    fn read_table(&self, bytes: &[u8]) -> Result<Table, DashboardError>;
}

/// Encodes a table for download.
pub trait TableWriter {
    fn write_table(&self, table: &Table) -> Result<Vec<u8>, DashboardError>;
}
