//! Web server adapter.
//!
//! Axum server with an HTMX front end. Each dashboard control issues a
//! request that recomputes its view from the shared workspace.

mod error;
mod handlers;
mod templates;

pub use error::WebError;
pub use handlers::*;
pub use templates::*;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::domain::config::DashboardConfig;
use crate::domain::workspace::Workspace;
use crate::ports::table_port::{TableReader, TableWriter};

pub struct AppState {
    pub workspace: Arc<Workspace>,
    pub reader: Arc<dyn TableReader + Send + Sync>,
    pub writer: Arc<dyn TableWriter + Send + Sync>,
    pub config: DashboardConfig,
}

pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::upload_page))
        .route("/upload", post(handlers::upload))
        .route("/summary", get(handlers::summary))
        .route("/summary/pie.svg", get(handlers::summary_pie_svg))
        .route("/summary/boxplot.svg", get(handlers::summary_boxplot_svg))
        .route("/correlation", get(handlers::correlation))
        .route("/correlation/heatmap.svg", get(handlers::correlation_heatmap_svg))
        .route("/prices", get(handlers::prices))
        .route("/prices/cell", post(handlers::edit_price))
        .route("/editor", get(handlers::editor))
        .route("/editor/column", post(handlers::add_column))
        .route("/editor/column/rename", post(handlers::rename_column))
        .route("/editor/row", post(handlers::add_row))
        .route("/editor/cell", post(handlers::edit_cell))
        .route("/editor/row/{row}/delete", post(handlers::delete_row))
        .route("/editor/export.csv", get(handlers::export_csv))
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(error::htmx_error_fragment))
                .layer(DefaultBodyLimit::max(max_upload)),
        )
        .with_state(Arc::new(state))
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` filter; a second call is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
