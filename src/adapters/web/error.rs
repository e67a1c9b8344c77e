//! HTTP error responses for web adapter.

use askama::Template;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::domain::error::DashboardError;

use super::is_htmx_request;
use super::templates::{BasePage, ErrorTemplate};

/// The rendered error section, attached to every error response so the
/// page layout can be stripped for HTMX callers.
#[derive(Debug, Clone)]
pub struct ErrorFragment(pub String);

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::ConfigMissing { .. }
        | DashboardError::ConfigInvalid { .. }
        | DashboardError::ConfigParse { .. }
        | DashboardError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        DashboardError::RowOutOfRange { .. } => StatusCode::NOT_FOUND,
        DashboardError::NoDataset => StatusCode::CONFLICT,
        DashboardError::Csv { .. } | DashboardError::MissingColumn { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DashboardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DashboardError> for WebError {
    fn from(err: DashboardError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "request failed");
        } else {
            tracing::warn!(status = %self.status, message = %self.message, "request rejected");
        }

        let template = ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        let content = match template.render() {
            Ok(html) => html,
            Err(_) => return (self.status, self.message).into_response(),
        };
        let page = BasePage {
            title: "Error",
            active: "",
            content: &content,
        };
        let mut response = match page.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, Html(content.clone())).into_response(),
        };
        response.extensions_mut().insert(ErrorFragment(content));
        response
    }
}

/// Middleware: HTMX requests get only the error section, swapped into
/// whatever target the control named.
pub async fn htmx_error_fragment(request: Request, next: Next) -> Response {
    let htmx = is_htmx_request(request.headers());
    let mut response = next.run(request).await;
    if !htmx {
        return response;
    }
    match response.extensions_mut().remove::<ErrorFragment>() {
        Some(ErrorFragment(fragment)) => (response.status(), Html(fragment)).into_response(),
        None => response,
    }
}
