//! HTTP handler functions for the dashboard.

use accident_dashboard_server_models::{ApiError, ApiHealth, ApiInvalidated};
use actix_web::{HttpResponse, web};

use crate::{AppState, DashboardError};

fn internal_error(context: &str, e: &dyn std::fmt::Display) -> HttpResponse {
    log::error!("{context}: {e}");
    HttpResponse::InternalServerError().json(ApiError {
        error: format!("{context}: {e}"),
    })
}

/// Runs `render` on the blocking pool; loading reads the CSV from disk.
async fn blocking<T, F>(state: web::Data<AppState>, render: F) -> Result<T, HttpResponse>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, DashboardError> + Send + 'static,
{
    match web::block(move || render(state.get_ref())).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(internal_error("Failed to render dashboard", &e)),
        Err(e) => Err(internal_error("Dashboard render was cancelled", &e)),
    }
}

/// `GET /`
///
/// Returns the dashboard page.
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    match blocking(state, AppState::render_html).await {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(resp) => resp,
    }
}

/// `GET /api/dashboard`
///
/// Returns the metric cards, chart specs and map sample as JSON.
pub async fn dashboard(state: web::Data<AppState>) -> HttpResponse {
    match blocking(state, AppState::render_payload).await {
        Ok(payload) => HttpResponse::Ok().json(payload),
        Err(resp) => resp,
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/cache/invalidate`
///
/// Drops every cached table so the next render reloads the CSV.
pub async fn invalidate(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiInvalidated {
        invalidated: state.loader.invalidate_all(),
    })
}
