use futures::stream::{self, StreamExt, TryStreamExt};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QueryResult};
use serde_json::{Map, Value};

use super::normalize::{ProductRow, maybe_number, normalize_product};
use super::{Catalog, CatalogError, statement};
use crate::entity::{product_image, product_review, product_service};
use crate::models::product::Product;
use crate::models::review::ReviewResponse;

/// Products hydrated at once by `list_products`. Each one holds up to three
/// pooled connections while it loads its children.
const LIST_HYDRATION_CONCURRENCY: usize = 3;

impl<C: ConnectionTrait> Catalog<'_, C> {
    /// Load and hydrate one product. `None` means there is no such product.
    pub async fn find_product(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        let Some(result) = self.conn.query_one_raw(statement::select_product(id)).await? else {
            return Ok(None);
        };
        let row = product_row(&result)?;
        Ok(Some(self.hydrate_product(&row).await?))
    }

    /// Every product, newest first, each hydrated independently.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let results = self.conn.query_all_raw(statement::select_products()).await?;
        let rows = results
            .iter()
            .map(product_row)
            .collect::<Result<Vec<_>, _>>()?;

        let hydrations: Vec<_> = rows.iter().map(|row| self.hydrate_product(row)).collect();
        stream::iter(hydrations)
            .buffered(LIST_HYDRATION_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Normalize a stored row and attach its images, services and reviews.
    pub async fn hydrate_product(&self, row: &ProductRow) -> Result<Product, CatalogError> {
        let mut product = normalize_product(row);

        let (images, services, reviews) = futures::try_join!(
            load_images(self.conn, &product.id),
            load_services(self.conn, &product.id),
            load_reviews(self.conn, &product.id),
        )?;

        product.images = images;
        product.services = services;
        product.reviews = reviews;
        Ok(product)
    }
}

fn product_row(result: &QueryResult) -> Result<ProductRow, DbErr> {
    match result.try_get::<Value>("", "product")? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

async fn load_images<C: ConnectionTrait>(conn: &C, product_id: &str) -> Result<Vec<String>, DbErr> {
    let images = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .order_by_asc(product_image::Column::Id)
        .all(conn)
        .await?;
    Ok(images.into_iter().map(|m| m.url).collect())
}

/// Services as `k -> v`; with duplicate keys the highest id wins.
async fn load_services<C: ConnectionTrait>(
    conn: &C,
    product_id: &str,
) -> Result<Map<String, Value>, DbErr> {
    let services = product_service::Entity::find()
        .filter(product_service::Column::ProductId.eq(product_id))
        .order_by_asc(product_service::Column::Id)
        .all(conn)
        .await?;

    let mut map = Map::new();
    for service in services {
        map.insert(service.k, maybe_number(&service.v));
    }
    Ok(map)
}

async fn load_reviews<C: ConnectionTrait>(
    conn: &C,
    product_id: &str,
) -> Result<Vec<ReviewResponse>, DbErr> {
    let reviews = product_review::Entity::find()
        .filter(product_review::Column::ProductId.eq(product_id))
        .order_by_desc(product_review::Column::CreatedAt)
        .order_by_desc(product_review::Column::Id)
        .all(conn)
        .await?;
    Ok(reviews.into_iter().map(ReviewResponse::from).collect())
}
