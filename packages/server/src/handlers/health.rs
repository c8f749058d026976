use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    summary = "Liveness check",
    description = "Pings the database. Returns plain text `ok`, or `db error` with status 500 when the database is unreachable.",
    responses(
        (status = 200, description = "Service and database are up", body = String, content_type = "text/plain"),
        (status = 500, description = "Database unreachable", body = String, content_type = "text/plain"),
    ),
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "db error")
        }
    }
}
