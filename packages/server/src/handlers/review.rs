use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::review::{AddReviewRequest, ReviewCreatedResponse};
use crate::models::shared::OkResponse;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/reviews",
    tag = "Product Reviews",
    operation_id = "addProductReview",
    summary = "Post a review for a product",
    params(("id" = String, Path, description = "Product ID")),
    request_body = AddReviewRequest,
    responses(
        (status = 201, description = "Review added", body = ReviewCreatedResponse),
        (status = 400, description = "`name` or `rating` missing", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AddReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let review_id = state.catalog().add_review(&id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReviewCreatedResponse {
            ok: true,
            review_id,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/reviews/{review_id}",
    tag = "Product Reviews",
    operation_id = "deleteProductReview",
    summary = "Delete one review of a product",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review deleted", body = OkResponse),
        (status = 404, description = "No such review on this product", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    Path((id, review_id)): Path<(String, i32)>,
) -> Result<Json<OkResponse>, AppError> {
    state.catalog().delete_review(&id, review_id).await?;
    Ok(Json(OkResponse::ok()))
}
