use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Base columns of the `products` table.
///
/// Optional columns added later at startup (specs, tags, flags,
/// release, warranty, notes) are not part of this model; product rows are
/// read and written through `catalog::statement` so they can vary per
/// deployment.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[sea_orm(default_value = 0.0)]
    pub price: f64,
    #[sea_orm(default_value = 0)]
    pub stock: i32,

    /// JSON-encoded string list.
    #[sea_orm(column_type = "Text", nullable)]
    pub colors: Option<String>,
    /// JSON-encoded string list.
    #[sea_orm(column_type = "Text", nullable)]
    pub features: Option<String>,

    #[sea_orm(has_many)]
    pub images: HasMany<super::product_image::Entity>,
    #[sea_orm(has_many)]
    pub services: HasMany<super::product_service::Entity>,
    #[sea_orm(has_many)]
    pub reviews: HasMany<super::product_review::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
