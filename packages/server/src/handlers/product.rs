use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::product::{Product, ProductCreatedResponse, ProductPayload};
use crate::models::shared::OkResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products",
    description = "Returns every product, newest first, with images, services and reviews attached.",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.catalog().list_products().await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product by ID",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = Product),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .catalog()
        .find_product(&id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "upsertProduct",
    summary = "Create or replace a product",
    description = "Creates the product, or overwrites every column of an existing product with the same `id`. Images and services are replaced with the ones in the body (absent means none). Reviews are kept.",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created or replaced", body = ProductCreatedResponse),
        (status = 400, description = "`id` or `name` missing", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = payload.id.as_deref().unwrap_or_default()))]
pub async fn upsert_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.catalog().upsert_product(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse { ok: true, id }),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Update an existing product",
    description = "Overwrites the columns of an existing product. Never creates one. Images and services are replaced only when the body carries them.",
    params(("id" = String, Path, description = "Product ID")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product updated", body = OkResponse),
        (status = 400, description = "`name` missing", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<Json<OkResponse>, AppError> {
    state.catalog().update_product(&id, &payload).await?;
    Ok(Json(OkResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product",
    description = "Deletes the product together with its images, services and reviews.",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = OkResponse),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Server error", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, AppError> {
    state.catalog().delete_product(&id).await?;
    Ok(Json(OkResponse::ok()))
}
