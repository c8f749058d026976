use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::shared::serialize_number;
use crate::entity::product_review;

/// Request body for posting a review.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct AddReviewRequest {
    #[schema(example = "Dana")]
    pub name: Option<String>,
    /// Must be present and nonzero.
    #[schema(value_type = Option<f64>, example = 5)]
    pub rating: Option<Value>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub name: String,
    #[serde(serialize_with = "serialize_number")]
    pub rating: f64,
    pub comment: Option<String>,
    /// `created_at` as milliseconds since the Unix epoch.
    pub ts: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewCreatedResponse {
    pub ok: bool,
    pub review_id: i32,
}

impl From<product_review::Model> for ReviewResponse {
    fn from(m: product_review::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            rating: m.rating,
            comment: m.comment,
            ts: m.created_at.timestamp_millis(),
            created_at: m.created_at,
        }
    }
}
