//! HTTP request handlers for web adapter.

use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::adapters::chart_svg::{boxplot_svg, heatmap_svg, pie_svg};
use crate::domain::dataset::Dataset;
use crate::domain::error::DashboardError;
use crate::domain::index::{default_returns_column, returns_columns};
use crate::domain::stats::CorrelationMatrix;
use crate::domain::table::paginate;
use crate::domain::views::{
    PriceView, SummaryView, correlation_view, price_view, snippet_columns, summary_view,
};

use super::templates::{
    CorrelationTemplate, DatasetInfo, EditorTemplate, MatrixView, Pager, PricesTemplate,
    ReturnsTemplate, SelectOption, SummaryTemplate, TableView, UploadTemplate, render_fragment,
    render_page, stat_rows,
};
use super::{AppState, WebError};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

impl PageQuery {
    fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }
}

fn upload_template(state: &AppState, page: usize) -> Result<UploadTemplate, WebError> {
    let max_upload_mb = format!("{:.1}", state.config.max_upload_bytes as f64 / 1_048_576.0);
    let dataset = match state.workspace.dataset() {
        Ok(ds) => ds,
        Err(DashboardError::NoDataset) => {
            return Ok(UploadTemplate {
                dataset: None,
                table: None,
                pager: None,
                max_upload_mb,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let snippet = dataset.table.project(&snippet_columns(&dataset.table))?;
    let window = paginate(snippet.len(), page, state.config.page_size);

    let years = dataset.years();
    let years = match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => format!("{} to {}", first, last),
        (Some(first), _) => first.to_string(),
        _ => String::new(),
    };
    let span = dataset
        .date_span()
        .map(|(lo, hi)| format!("{} to {}", lo.format(DATE_FORMAT), hi.format(DATE_FORMAT)))
        .unwrap_or_default();

    Ok(UploadTemplate {
        dataset: Some(DatasetInfo {
            name: dataset.name.clone(),
            rows: dataset.table.len(),
            columns: dataset.table.width(),
            years,
            span,
        }),
        table: Some(TableView::window(&snippet, window)),
        pager: Some(Pager::new("/", window)),
        max_upload_mb,
    })
}

pub async fn upload_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Response, WebError> {
    let template = upload_template(&state, query.page())?;
    render_page(&headers, "Upload", "upload", &template)
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or("upload.csv")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::new(e.status(), e.body_text()))?;
        upload = Some((name, bytes));
        break;
    }

    let (name, bytes) = upload.ok_or_else(|| WebError::bad_request("no file uploaded"))?;
    if bytes.is_empty() {
        return Err(WebError::bad_request("uploaded file is empty"));
    }

    let table = state.reader.read_table(&bytes)?;
    tracing::info!(file = %name, rows = table.len(), columns = table.width(), "dataset uploaded");
    state.workspace.replace(Dataset::new(name, table));

    let template = upload_template(&state, 1)?;
    render_page(&headers, "Upload", "upload", &template)
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub index: Option<String>,
    pub year: Option<String>,
}

struct SummarySelection {
    dataset: Arc<Dataset>,
    years: Vec<i32>,
    view: SummaryView,
}

fn select_summary(state: &AppState, query: &SummaryQuery) -> Result<SummarySelection, WebError> {
    let dataset = state.workspace.dataset()?;

    let index = match query.index.as_deref().map(str::trim) {
        Some(index) if !index.is_empty() => index.to_string(),
        _ => default_returns_column(&dataset.table, &state.config.default_index)
            .ok_or_else(|| DashboardError::missing_column(state.config.default_index.as_str()))?,
    };

    let years = dataset.years();
    let year = match query.year.as_deref().map(str::trim) {
        Some(year) if !year.is_empty() => year
            .parse::<i32>()
            .map_err(|_| WebError::bad_request(format!("invalid year: {}", year)))?,
        _ => *years
            .first()
            .ok_or_else(|| WebError::bad_request("dataset has no Year or Date values"))?,
    };

    let view = summary_view(&dataset, &index, year)?;
    Ok(SummarySelection {
        dataset,
        years,
        view,
    })
}

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, WebError> {
    let SummarySelection {
        dataset,
        years,
        view,
    } = select_summary(&state, &query)?;

    let options = returns_columns(&dataset.table)
        .into_iter()
        .map(|o| SelectOption {
            selected: o.column == view.index_column,
            value: o.column,
            label: o.label,
        })
        .collect();
    let years = years
        .into_iter()
        .map(|y| SelectOption {
            value: y.to_string(),
            label: y.to_string(),
            selected: y == view.year,
        })
        .collect();

    let template = SummaryTemplate {
        options,
        years,
        index_column: view.index_column.clone(),
        title: view.title(),
        stats: stat_rows(&view.describe),
        pie_svg: pie_svg(&view.pie_title(), &view.split),
        box_svg: boxplot_svg(&view.title(), view.box_stats.as_ref()),
    };
    render_page(&headers, "Summary", "summary", &template)
}

pub async fn summary_pie_svg(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, WebError> {
    let view = select_summary(&state, &query)?.view;
    Ok(svg_response(pie_svg(&view.pie_title(), &view.split)))
}

pub async fn summary_boxplot_svg(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, WebError> {
    let view = select_summary(&state, &query)?.view;
    Ok(svg_response(boxplot_svg(&view.title(), view.box_stats.as_ref())))
}

/// Columns named by repeated `indices` parameters. A submitted form with
/// nothing ticked carries `submitted` and yields an empty selection; a bare
/// request falls back to the configured defaults.
fn correlation_selection(
    state: &AppState,
    dataset: &Dataset,
    params: &[(String, String)],
) -> Vec<String> {
    let explicit: Vec<String> = params
        .iter()
        .filter(|(k, v)| k == "indices" && !v.trim().is_empty())
        .map(|(_, v)| v.trim().to_string())
        .collect();
    if !explicit.is_empty() || params.iter().any(|(k, _)| k == "submitted") {
        return explicit;
    }

    let defaults: Vec<String> = state
        .config
        .default_correlation
        .iter()
        .filter(|c| dataset.table.has_column(c))
        .cloned()
        .collect();
    if defaults.len() >= 2 {
        return defaults;
    }
    returns_columns(&dataset.table)
        .into_iter()
        .take(2)
        .map(|o| o.column)
        .collect()
}

fn compute_correlation(dataset: &Dataset, selected: &[String]) -> Result<CorrelationMatrix, DashboardError> {
    let columns: Vec<&str> = selected.iter().map(String::as_str).collect();
    correlation_view(dataset, &columns)
}

pub async fn correlation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    let dataset = state.workspace.dataset()?;
    let selected = correlation_selection(&state, &dataset, &params);

    let options = returns_columns(&dataset.table)
        .into_iter()
        .map(|o| SelectOption {
            selected: selected.contains(&o.column),
            value: o.column,
            label: o.label,
        })
        .collect();

    let template = match compute_correlation(&dataset, &selected) {
        Ok(matrix) => CorrelationTemplate {
            options,
            message: None,
            heatmap_svg: Some(heatmap_svg(&matrix)),
            matrix: Some(MatrixView::from(&matrix)),
        },
        Err(DashboardError::InvalidInput { reason }) => CorrelationTemplate {
            options,
            message: Some(reason),
            heatmap_svg: None,
            matrix: None,
        },
        Err(e) => return Err(e.into()),
    };
    render_page(&headers, "Correlation", "correlation", &template)
}

pub async fn correlation_heatmap_svg(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    let dataset = state.workspace.dataset()?;
    let selected = correlation_selection(&state, &dataset, &params);
    let matrix = compute_correlation(&dataset, &selected)?;
    Ok(svg_response(heatmap_svg(&matrix)))
}

#[derive(Debug, Default, Deserialize)]
pub struct PriceQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub page: Option<usize>,
}

fn parse_date_param(name: &str, raw: &str) -> Result<NaiveDate, WebError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| WebError::bad_request(format!("invalid {} date: {}", name, raw)))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn prices_base(view: &PriceView) -> String {
    format!(
        "/prices?start={}&end={}",
        view.start.format(DATE_FORMAT),
        view.end.format(DATE_FORMAT)
    )
}

pub async fn prices(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PriceQuery>,
) -> Result<Response, WebError> {
    let dataset = state.workspace.dataset()?;
    let page = query.page.unwrap_or(1);

    let view = match (non_empty(&query.start), non_empty(&query.end)) {
        (Some(start), Some(end)) => {
            let start = parse_date_param("start", start)?;
            let end = parse_date_param("end", end)?;
            // Keep edits made to the current range.
            match state.workspace.prices() {
                Some(view) if view.start == start && view.end == end => Some(view),
                _ => {
                    let view = price_view(&dataset, &state.config.price_columns, start, end)?;
                    if !state.workspace.set_prices(&dataset, view.clone()) {
                        tracing::debug!("dataset replaced while computing prices; view not stored");
                    }
                    Some(view)
                }
            }
        }
        (None, None) => state.workspace.prices(),
        _ => return Err(WebError::bad_request("select both a start and an end date")),
    };

    let template = match view {
        Some(view) => {
            let window = paginate(view.prices.len(), page, state.config.page_size);
            PricesTemplate {
                start: view.start.format(DATE_FORMAT).to_string(),
                end: view.end.format(DATE_FORMAT).to_string(),
                page: window.page,
                prices: Some(TableView::window(&view.prices, window)),
                returns: Some(TableView::window(&view.returns, window)),
                pager: Some(Pager::new(&prices_base(&view), window)),
            }
        }
        None => {
            let (start, end) = dataset
                .date_span()
                .map(|(lo, hi)| (lo.format(DATE_FORMAT).to_string(), hi.format(DATE_FORMAT).to_string()))
                .unwrap_or_default();
            PricesTemplate {
                start,
                end,
                page: 1,
                prices: None,
                returns: None,
                pager: None,
            }
        }
    };
    render_page(&headers, "Prices & Returns", "prices", &template)
}

#[derive(Debug, Deserialize)]
pub struct PriceCellForm {
    pub row: usize,
    pub column: usize,
    pub value: String,
    pub page: Option<usize>,
}

/// Edit one price cell; responds with the recomputed returns table.
pub async fn edit_price(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PriceCellForm>,
) -> Result<Response, WebError> {
    let returns = state.workspace.edit_prices(|view| {
        view.edit_price(form.row, form.column, &form.value)?;
        Ok(view.returns.clone())
    })?;
    tracing::info!(row = form.row, column = form.column, "price edited");

    let window = paginate(returns.len(), form.page.unwrap_or(1), state.config.page_size);
    let template = ReturnsTemplate {
        returns: TableView::window(&returns, window),
    };
    Ok(Html(render_fragment(&template)?).into_response())
}

fn render_editor(state: &AppState, headers: &HeaderMap, page: usize) -> Result<Response, WebError> {
    let sheet = state.workspace.sheet()?;
    let window = paginate(sheet.len(), page, state.config.page_size);
    let template = EditorTemplate {
        table: TableView::window(&sheet, window),
        pager: Pager::new("/editor", window),
        page: window.page,
        columns: sheet.headers().to_vec(),
        row_count: sheet.len(),
    };
    render_page(headers, "Editor", "editor", &template)
}

pub async fn editor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Response, WebError> {
    render_editor(&state, &headers, query.page())
}

#[derive(Debug, Deserialize)]
pub struct ColumnForm {
    pub name: String,
    pub page: Option<usize>,
}

pub async fn add_column(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ColumnForm>,
) -> Result<Response, WebError> {
    let name = form.name.trim();
    state.workspace.edit_sheet(|sheet| sheet.add_column(name))?;
    tracing::info!(column = %name, "column added");
    render_editor(&state, &headers, form.page.unwrap_or(1))
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    pub from: String,
    pub to: String,
    pub page: Option<usize>,
}

pub async fn rename_column(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<RenameForm>,
) -> Result<Response, WebError> {
    let to = form.to.trim();
    state
        .workspace
        .edit_sheet(|sheet| sheet.rename_column(&form.from, to))?;
    tracing::info!(from = %form.from, to = %to, "column renamed");
    render_editor(&state, &headers, form.page.unwrap_or(1))
}

/// Append a blank row and show the page it landed on.
pub async fn add_row(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let row = state.workspace.edit_sheet(|sheet| Ok(sheet.add_row()))?;
    tracing::info!(row, "row added");
    let page = row / state.config.page_size + 1;
    render_editor(&state, &headers, page)
}

#[derive(Debug, Deserialize)]
pub struct CellForm {
    pub row: usize,
    pub column: usize,
    pub value: String,
}

pub async fn edit_cell(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CellForm>,
) -> Result<StatusCode, WebError> {
    state
        .workspace
        .edit_sheet(|sheet| sheet.set_cell(form.row, form.column, &form.value))?;
    tracing::info!(row = form.row, column = form.column, "cell edited");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_row(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(row): Path<usize>,
    Query(query): Query<PageQuery>,
) -> Result<Response, WebError> {
    state.workspace.edit_sheet(|sheet| sheet.delete_row(row))?;
    tracing::info!(row, "row deleted");
    render_editor(&state, &headers, query.page())
}

pub async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let sheet = state.workspace.sheet()?;
    let bytes = state.writer.write_table(&sheet)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"sheet.csv\""),
        ],
        bytes,
    )
        .into_response())
}

pub async fn not_found() -> WebError {
    WebError::not_found("page not found")
}
