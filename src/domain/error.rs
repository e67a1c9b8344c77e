//! Domain error types.

/// Top-level error type for indexdash.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("CSV error: {reason}")]
    Csv { reason: String },

    #[error("column not found: {column}")]
    MissingColumn { column: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("row {row} out of range (table has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("no dataset uploaded; upload a CSV first")]
    NoDataset,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            reason: err.to_string(),
        }
    }
}

impl DashboardError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            DashboardError::Io(_) => 1,
            DashboardError::ConfigParse { .. }
            | DashboardError::ConfigMissing { .. }
            | DashboardError::ConfigInvalid { .. } => 2,
            DashboardError::Csv { .. } => 3,
            DashboardError::MissingColumn { .. }
            | DashboardError::InvalidInput { .. }
            | DashboardError::RowOutOfRange { .. } => 4,
            DashboardError::NoDataset => 5,
        }
    }
}

impl From<&DashboardError> for std::process::ExitCode {
    fn from(err: &DashboardError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
