use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::product::{AddImageRequest, ImageCreatedResponse};
use crate::models::shared::OkResponse;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/images",
    tag = "Product Images",
    operation_id = "addProductImage",
    summary = "Append an image to a product",
    params(("id" = String, Path, description = "Product ID")),
    request_body = AddImageRequest,
    responses(
        (status = 201, description = "Image added", body = ImageCreatedResponse),
        (status = 400, description = "`url` missing", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn add_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AddImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let image_id = state
        .catalog()
        .add_image(&id, payload.url.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ImageCreatedResponse { ok: true, image_id }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/images/{image_id}",
    tag = "Product Images",
    operation_id = "deleteProductImage",
    summary = "Delete one image of a product",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("image_id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image deleted", body = OkResponse),
        (status = 404, description = "No such image on this product", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(String, i32)>,
) -> Result<Json<OkResponse>, AppError> {
    state.catalog().delete_image(&id, image_id).await?;
    Ok(Json(OkResponse::ok()))
}
