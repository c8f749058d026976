use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use serde_json::Value;
use tracing::debug;

use super::normalize::scalar_text;
use super::{Catalog, CatalogError};
use crate::entity::{product, product_image, product_service};
use crate::models::product::ServiceRequest;

/// Image URLs from bare strings or `{ "url": ... }` objects, trimmed, empties dropped.
pub fn normalize_images(value: Option<&Value>) -> Vec<String> {
    let items = match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url.as_str()),
            Value::Object(obj) => obj.get("url").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Service entries from `[{ k|key, v|value }]` or a plain `{ key: value }` object.
///
/// Keys are trimmed and must be non-empty; values are kept as text. Duplicate
/// keys are preserved in input order.
pub fn normalize_services(value: Option<&Value>) -> Vec<(String, String)> {
    let entry = |key: Option<&Value>, value: Option<&Value>| {
        let key = key.and_then(Value::as_str).map(str::trim).unwrap_or_default();
        let value = value.and_then(scalar_text)?;
        (!key.is_empty()).then(|| (key.to_string(), value))
    };

    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|obj| {
                entry(
                    obj.get("k").or_else(|| obj.get("key")),
                    obj.get("v").or_else(|| obj.get("value")),
                )
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(k, v)| entry(Some(&Value::String(k.clone())), Some(v)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Delete every image of the product, then insert `urls` in order.
pub async fn replace_images<C: ConnectionTrait>(
    conn: &C,
    product_id: &str,
    urls: &[String],
) -> Result<(), DbErr> {
    let removed = product_image::Entity::delete_many()
        .filter(product_image::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?
        .rows_affected;

    for url in urls {
        let model = product_image::ActiveModel {
            product_id: Set(product_id.to_string()),
            url: Set(url.clone()),
            ..Default::default()
        };
        product_image::Entity::insert(model)
            .exec_without_returning(conn)
            .await?;
    }

    debug!(product_id, removed, inserted = urls.len(), "Replaced product images");
    Ok(())
}

/// Delete every service of the product, then insert `entries` in order.
pub async fn replace_services<C: ConnectionTrait>(
    conn: &C,
    product_id: &str,
    entries: &[(String, String)],
) -> Result<(), DbErr> {
    let removed = product_service::Entity::delete_many()
        .filter(product_service::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?
        .rows_affected;

    for (k, v) in entries {
        let model = product_service::ActiveModel {
            product_id: Set(product_id.to_string()),
            k: Set(k.clone()),
            v: Set(v.clone()),
            ..Default::default()
        };
        product_service::Entity::insert(model)
            .exec_without_returning(conn)
            .await?;
    }

    debug!(product_id, removed, inserted = entries.len(), "Replaced product services");
    Ok(())
}

impl<C: ConnectionTrait> Catalog<'_, C> {
    pub(crate) async fn ensure_product_exists(&self, product_id: &str) -> Result<(), CatalogError> {
        let count = product::Entity::find_by_id(product_id.to_string())
            .count(self.conn)
            .await?;
        if count == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    /// Append a single image. Returns the new image id.
    pub async fn add_image(&self, product_id: &str, url: Option<&str>) -> Result<i32, CatalogError> {
        let url = url.map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(CatalogError::Validation("url is required".into()));
        }
        self.ensure_product_exists(product_id).await?;

        let model = product_image::ActiveModel {
            product_id: Set(product_id.to_string()),
            url: Set(url.to_string()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(model.id)
    }

    pub async fn delete_image(&self, product_id: &str, image_id: i32) -> Result<(), CatalogError> {
        let result = product_image::Entity::delete_many()
            .filter(product_image::Column::Id.eq(image_id))
            .filter(product_image::Column::ProductId.eq(product_id))
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    /// Append a single service entry. Returns the new service id.
    pub async fn add_service(
        &self,
        product_id: &str,
        request: &ServiceRequest,
    ) -> Result<i32, CatalogError> {
        let key = request.k.as_deref().map(str::trim).unwrap_or_default();
        let value = request.v.as_ref().and_then(scalar_text);
        let Some(value) = value.filter(|_| !key.is_empty()) else {
            return Err(CatalogError::Validation("k and v are required".into()));
        };
        self.ensure_product_exists(product_id).await?;

        let model = product_service::ActiveModel {
            product_id: Set(product_id.to_string()),
            k: Set(key.to_string()),
            v: Set(value),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(model.id)
    }

    /// Update the key and/or value of one service entry of this product.
    pub async fn update_service(
        &self,
        product_id: &str,
        service_id: i32,
        request: &ServiceRequest,
    ) -> Result<(), CatalogError> {
        let key = request.k.as_deref().map(str::trim);
        if key.is_some_and(str::is_empty) {
            return Err(CatalogError::Validation("k must not be empty".into()));
        }
        let value = request.v.as_ref().and_then(scalar_text);
        if key.is_none() && value.is_none() {
            return Err(CatalogError::Validation("k or v is required".into()));
        }

        let mut update = product_service::Entity::update_many()
            .filter(product_service::Column::Id.eq(service_id))
            .filter(product_service::Column::ProductId.eq(product_id));
        if let Some(key) = key {
            update = update.col_expr(product_service::Column::K, Expr::value(key));
        }
        if let Some(value) = value {
            update = update.col_expr(product_service::Column::V, Expr::value(value));
        }

        let result = update.exec(self.conn).await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_service(&self, product_id: &str, service_id: i32) -> Result<(), CatalogError> {
        let result = product_service::Entity::delete_many()
            .filter(product_service::Column::Id.eq(service_id))
            .filter(product_service::Column::ProductId.eq(product_id))
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }
}
