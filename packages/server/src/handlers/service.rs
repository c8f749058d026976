use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::product::{ServiceCreatedResponse, ServiceRequest};
use crate::models::shared::OkResponse;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/services",
    tag = "Product Services",
    operation_id = "addProductService",
    summary = "Append a service entry to a product",
    params(("id" = String, Path, description = "Product ID")),
    request_body = ServiceRequest,
    responses(
        (status = 201, description = "Service added", body = ServiceCreatedResponse),
        (status = 400, description = "`k` or `v` missing", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn add_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service_id = state.catalog().add_service(&id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ServiceCreatedResponse {
            ok: true,
            service_id,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}/services/{service_id}",
    tag = "Product Services",
    operation_id = "updateProductService",
    summary = "Update one service entry of a product",
    description = "Sets the key, the value, or both. At least one must be given.",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("service_id" = i32, Path, description = "Service ID"),
    ),
    request_body = ServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = OkResponse),
        (status = 400, description = "Nothing to update", body = ErrorBody),
        (status = 404, description = "No such service on this product", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_service(
    State(state): State<AppState>,
    Path((id, service_id)): Path<(String, i32)>,
    AppJson(payload): AppJson<ServiceRequest>,
) -> Result<Json<OkResponse>, AppError> {
    state
        .catalog()
        .update_service(&id, service_id, &payload)
        .await?;
    Ok(Json(OkResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/{id}/services/{service_id}",
    tag = "Product Services",
    operation_id = "deleteProductService",
    summary = "Delete one service entry of a product",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("service_id" = i32, Path, description = "Service ID"),
    ),
    responses(
        (status = 200, description = "Service deleted", body = OkResponse),
        (status = 404, description = "No such service on this product", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_service(
    State(state): State<AppState>,
    Path((id, service_id)): Path<(String, i32)>,
) -> Result<Json<OkResponse>, AppError> {
    state.catalog().delete_service(&id, service_id).await?;
    Ok(Json(OkResponse::ok()))
}
