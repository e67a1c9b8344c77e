//! Dashboard configuration: defaults plus validation of the INI values.

use std::net::SocketAddr;
use std::path::PathBuf;

use super::error::DashboardError;
use super::index::{DEFAULT_CORRELATION, DEFAULT_PRICE_COLUMNS, DEFAULT_SUMMARY_INDEX};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:4050";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub listen: SocketAddr,
    pub default_index: String,
    pub default_correlation: Vec<String>,
    pub price_columns: Vec<String>,
    pub page_size: usize,
    pub max_upload_bytes: usize,
    pub preload: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 4050)),
            default_index: DEFAULT_SUMMARY_INDEX.to_string(),
            default_correlation: DEFAULT_CORRELATION.iter().map(|s| s.to_string()).collect(),
            price_columns: DEFAULT_PRICE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            page_size: DEFAULT_PAGE_SIZE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            preload: None,
        }
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> DashboardError {
    DashboardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> Result<usize, DashboardError> {
    let value = config.get_int(section, key, default as i64);
    if value < 1 {
        return Err(invalid(section, key, &format!("{key} must be at least 1")));
    }
    usize::try_from(value).map_err(|_| invalid(section, key, &format!("{key} is too large")))
}

fn non_empty_list(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Vec<String>,
) -> Result<Vec<String>, DashboardError> {
    match config.get_list(section, key) {
        None => Ok(default),
        Some(list) if list.is_empty() => Err(invalid(section, key, &format!("{key} must name at least one column"))),
        Some(list) => Ok(list),
    }
}

/// Build and validate the dashboard configuration. Every key is optional.
pub fn build_dashboard_config(config: &dyn ConfigPort) -> Result<DashboardConfig, DashboardError> {
    let defaults = DashboardConfig::default();

    let listen = match config.get_string("web", "listen") {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid("web", "listen", "listen must be a socket address such as 127.0.0.1:4050"))?,
        None => defaults.listen,
    };

    let default_index = match config.get_string("dashboard", "default_index") {
        Some(s) if s.trim().is_empty() => {
            return Err(invalid("dashboard", "default_index", "default_index must not be empty"));
        }
        Some(s) => s.trim().to_string(),
        None => defaults.default_index,
    };

    let default_correlation = non_empty_list(config, "dashboard", "default_correlation", defaults.default_correlation)?;
    let price_columns = non_empty_list(config, "dashboard", "price_columns", defaults.price_columns)?;
    let page_size = positive(config, "dashboard", "page_size", defaults.page_size)?;
    let max_upload_bytes = positive(config, "dashboard", "max_upload_bytes", defaults.max_upload_bytes)?;

    let preload = config
        .get_string("data", "preload")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    Ok(DashboardConfig {
        listen,
        default_index,
        default_correlation,
        price_columns,
        page_size,
        max_upload_bytes,
        preload,
    })
}
