//! HTML templates using Askama, and the view models they render.

use askama::Template;
use axum::{
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};

use crate::adapters::chart_svg::format_correlation;
use crate::domain::stats::{CorrelationMatrix, Describe};
use crate::domain::table::{PageWindow, Table};

use super::{WebError, is_htmx_request};

#[derive(Template)]
#[template(path = "base.html")]
pub struct BasePage<'a> {
    pub title: &'a str,
    pub active: &'a str,
    pub content: &'a str,
}

/// Render `content`; HTMX requests get the bare fragment, everything else
/// the full layout.
pub fn render_page<T: Template>(
    headers: &HeaderMap,
    title: &str,
    active: &str,
    content: &T,
) -> Result<Response, WebError> {
    let fragment = render_fragment(content)?;
    if is_htmx_request(headers) {
        return Ok(Html(fragment).into_response());
    }
    let page = BasePage {
        title,
        active,
        content: &fragment,
    };
    let html = page
        .render()
        .map_err(|e| WebError::internal(format!("template error: {e}")))?;
    Ok(Html(html).into_response())
}

pub fn render_fragment<T: Template>(content: &T) -> Result<String, WebError> {
    content
        .render()
        .map_err(|e| WebError::internal(format!("template error: {e}")))
}

pub struct RowView {
    /// Absolute row index in the underlying table.
    pub index: usize,
    pub cells: Vec<String>,
}

pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<RowView>,
}

impl TableView {
    pub fn window(table: &Table, window: PageWindow) -> Self {
        let rows = table
            .display_rows(window.range())
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RowView {
                index: window.start + i,
                cells,
            })
            .collect();
        Self {
            headers: table.headers().to_vec(),
            rows,
        }
    }
}

pub struct Pager {
    pub page: usize,
    pub pages: usize,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl Pager {
    /// `base` is the URL the page number is appended to, e.g. `/editor` or
    /// `/prices?start=2020-01-01&end=2020-12-31`.
    pub fn new(base: &str, window: PageWindow) -> Self {
        let sep = if base.contains('?') { '&' } else { '?' };
        let link = |page: usize| format!("{}{}page={}", base, sep, page);
        Self {
            page: window.page,
            pages: window.pages,
            prev: window.has_prev().then(|| link(window.page - 1)),
            next: window.has_next().then(|| link(window.page + 1)),
        }
    }
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct StatRow {
    pub label: &'static str,
    pub value: String,
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{}", value)
    }
}

pub fn stat_rows(describe: &Describe) -> Vec<StatRow> {
    describe
        .rows()
        .iter()
        .map(|&(label, value)| StatRow {
            label,
            value: format_stat(value),
        })
        .collect()
}

pub struct MatrixRow {
    pub label: String,
    pub cells: Vec<String>,
}

pub struct MatrixView {
    pub labels: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

impl From<&CorrelationMatrix> for MatrixView {
    fn from(matrix: &CorrelationMatrix) -> Self {
        Self {
            labels: matrix.labels.clone(),
            rows: matrix
                .labels
                .iter()
                .zip(&matrix.values)
                .map(|(label, row)| MatrixRow {
                    label: label.clone(),
                    cells: row.iter().map(|&v| format_correlation(v)).collect(),
                })
                .collect(),
        }
    }
}

pub struct DatasetInfo {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub years: String,
    pub span: String,
}

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub dataset: Option<DatasetInfo>,
    pub table: Option<TableView>,
    pub pager: Option<Pager>,
    pub max_upload_mb: String,
}

#[derive(Template)]
#[template(path = "summary.html")]
pub struct SummaryTemplate {
    pub options: Vec<SelectOption>,
    pub years: Vec<SelectOption>,
    pub index_column: String,
    pub title: String,
    pub stats: Vec<StatRow>,
    pub pie_svg: String,
    pub box_svg: String,
}

#[derive(Template)]
#[template(path = "correlation.html")]
pub struct CorrelationTemplate {
    pub options: Vec<SelectOption>,
    pub message: Option<String>,
    pub heatmap_svg: Option<String>,
    pub matrix: Option<MatrixView>,
}

#[derive(Template)]
#[template(path = "prices.html")]
pub struct PricesTemplate {
    pub start: String,
    pub end: String,
    pub page: usize,
    pub prices: Option<TableView>,
    pub returns: Option<TableView>,
    pub pager: Option<Pager>,
}

#[derive(Template)]
#[template(path = "returns_table.html")]
pub struct ReturnsTemplate {
    pub returns: TableView,
}

#[derive(Template)]
#[template(path = "editor.html")]
pub struct EditorTemplate {
    pub table: TableView,
    pub pager: Pager,
    pub page: usize,
    pub columns: Vec<String>,
    pub row_count: usize,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
