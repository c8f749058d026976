use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::review::ReviewResponse;
use super::shared::serialize_number;

/// A fully hydrated product as returned to clients.
///
/// Collections are never `null`: missing or malformed stored values come
/// back as `[]` / `{}`, and text fields as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Product {
    #[schema(example = "s21-ultra")]
    pub id: String,
    #[schema(example = "Galaxy S21 Ultra")]
    pub name: String,
    #[schema(example = "Samsung")]
    pub brand: String,
    #[schema(example = "phones")]
    pub category: String,
    #[schema(example = 1199)]
    #[serde(serialize_with = "serialize_number")]
    pub price: f64,
    #[schema(example = 12)]
    pub stock: i64,
    pub colors: Vec<String>,
    pub features: Vec<String>,
    #[schema(value_type = Object)]
    pub specs: Map<String, Value>,
    pub tags: Vec<String>,
    pub active: bool,
    pub featured: bool,
    /// Release date as `YYYY-MM-DD`, or `""` when unknown.
    #[schema(example = "2021-01-29")]
    pub release: String,
    pub warranty: String,
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Image URLs in display order.
    pub images: Vec<String>,
    /// Service name to price (numbers when the stored value looks numeric).
    #[schema(value_type = Object)]
    pub services: Map<String, Value>,
    /// Newest first.
    pub reviews: Vec<ReviewResponse>,
}

/// Client-supplied product body for create (upsert) and update.
///
/// Loosely typed on purpose: values are coerced by the catalog normalizers
/// rather than rejected, so `"price": "1199"` and `"active": 0` are accepted.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct ProductPayload {
    #[schema(example = "s21-ultra")]
    pub id: Option<String>,
    #[schema(example = "Galaxy S21 Ultra")]
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[schema(value_type = Option<f64>, example = 1199)]
    pub price: Option<Value>,
    #[schema(value_type = Option<i64>)]
    pub stock: Option<Value>,
    #[schema(value_type = Option<Vec<String>>)]
    pub colors: Option<Value>,
    #[schema(value_type = Option<Vec<String>>)]
    pub features: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub specs: Option<Value>,
    #[schema(value_type = Option<Vec<String>>)]
    pub tags: Option<Value>,
    #[schema(value_type = Option<bool>)]
    pub active: Option<Value>,
    #[schema(value_type = Option<bool>)]
    pub featured: Option<Value>,
    /// Date or ISO timestamp; only the `YYYY-MM-DD` part is kept.
    #[schema(value_type = Option<String>, example = "2021-01-29")]
    pub release: Option<Value>,
    /// Older name of `release`, used when `release` is absent or null.
    #[schema(value_type = Option<String>)]
    pub release_date: Option<Value>,
    pub warranty: Option<String>,
    pub notes: Option<String>,
    /// URL strings or `{ "url": ... }` objects. Replaces all images.
    #[schema(value_type = Option<Vec<String>>)]
    pub images: Option<Value>,
    /// `[{ "k", "v" }]` entries or a plain `{ key: value }` object. Replaces all services.
    #[schema(value_type = Option<Object>)]
    pub services: Option<Value>,
}

/// Response for a created or upserted product.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductCreatedResponse {
    pub ok: bool,
    #[schema(example = "s21-ultra")]
    pub id: String,
}

/// Request body for appending one image.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AddImageRequest {
    #[schema(example = "https://cdn.example.com/s21/front.jpg")]
    pub url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageCreatedResponse {
    pub ok: bool,
    pub image_id: i32,
}

/// Request body for appending or updating one service entry.
///
/// `key`/`value` are accepted as aliases of `k`/`v`.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct ServiceRequest {
    #[serde(alias = "key")]
    #[schema(example = "Screen replacement")]
    pub k: Option<String>,
    #[serde(alias = "value")]
    #[schema(value_type = Option<String>, example = "299")]
    pub v: Option<Value>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ServiceCreatedResponse {
    pub ok: bool,
    pub service_id: i32,
}
