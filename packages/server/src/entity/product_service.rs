use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A key/value service entry (e.g. "Screen replacement" -> "299").
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub product_id: String,
    #[sea_orm(belongs_to, from = "product_id", to = "id")]
    pub product: HasOne<super::product::Entity>,

    pub k: String,
    /// Always stored as text; numeric-looking values are rendered as numbers on read.
    #[sea_orm(column_type = "Text")]
    pub v: String,
}

impl ActiveModelBehavior for ActiveModel {}
