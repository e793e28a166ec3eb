//! Route table

use crate::server::handlers::{payments, projects};
use crate::server::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Multipart framing allowance on top of the file size cap
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the full router
///
/// - GET /health
/// - /api/projects (+ /get and /create aliases), /api/projects/{id}
/// - GET /api/projects/export, POST /api/projects/import
/// - /api/payments, /api/payments/{id}, POST /api/payments/{id}/pay
///
/// Static segments take precedence over `{id}`, so `/api/projects/export`
/// never reaches the record handlers.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes + MULTIPART_OVERHEAD);

    Router::new()
        .route("/health", get(health_check))
        // Projects
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/api/projects/get", get(projects::list_projects))
        .route("/api/projects/create", post(projects::create_project))
        .route("/api/projects/export", get(projects::export_projects))
        .route(
            "/api/projects/import",
            post(projects::import_projects).layer(upload_limit),
        )
        .route(
            "/api/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Payments
        .route(
            "/api/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/api/payments/{id}",
            get(payments::get_payment)
                .put(payments::update_payment)
                .delete(payments::delete_payment),
        )
        .route("/api/payments/{id}/pay", post(payments::mark_payment_paid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "project-ledger"
    }))
}
