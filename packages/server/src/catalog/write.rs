use sea_orm::{ConnectionTrait, EntityTrait, TransactionSession, TransactionTrait};
use tracing::info;

use super::children::{normalize_images, normalize_services, replace_images, replace_services};
use super::normalize::normalize_payload;
use super::{Catalog, CatalogError, statement};
use crate::entity::product;
use crate::models::product::ProductPayload;

impl<C: ConnectionTrait + TransactionTrait> Catalog<'_, C> {
    /// Create the product or overwrite it entirely, then replace its images
    /// and services. Returns the product id.
    ///
    /// Absent `images`/`services` replace the collections with nothing.
    /// Reviews are left alone.
    pub async fn upsert_product(&self, payload: &ProductPayload) -> Result<String, CatalogError> {
        let id = payload.id.as_deref().map(str::trim).unwrap_or_default();
        let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
        if id.is_empty() || name.is_empty() {
            return Err(CatalogError::Validation("id and name are required".into()));
        }

        let record = normalize_payload(payload);
        let images = normalize_images(payload.images.as_ref());
        let services = normalize_services(payload.services.as_ref());
        let stmt = statement::upsert_product(&self.schema, id, &record);

        let txn = self.conn.begin().await?;
        txn.execute_raw(txn.get_database_backend().build(&stmt))
            .await?;
        replace_images(&txn, id, &images).await?;
        replace_services(&txn, id, &services).await?;
        txn.commit().await?;

        info!(id, images = images.len(), services = services.len(), "Upserted product");
        Ok(id.to_string())
    }

    /// Overwrite an existing product. Never creates one.
    ///
    /// Images and services are replaced only when the payload carries them.
    pub async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<(), CatalogError> {
        if payload.name.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            return Err(CatalogError::Validation("name is required".into()));
        }

        let record = normalize_payload(payload);
        let stmt = statement::update_product(&self.schema, id, &record);

        let txn = self.conn.begin().await?;
        let result = txn
            .execute_raw(txn.get_database_backend().build(&stmt))
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }

        if let Some(images) = payload.images.as_ref() {
            replace_images(&txn, id, &normalize_images(Some(images))).await?;
        }
        if let Some(services) = payload.services.as_ref() {
            replace_services(&txn, id, &normalize_services(Some(services))).await?;
        }
        txn.commit().await?;

        info!(id, "Updated product");
        Ok(())
    }
}

impl<C: ConnectionTrait> Catalog<'_, C> {
    /// Delete a product; images, services and reviews go with it (FK cascade).
    pub async fn delete_product(&self, id: &str) -> Result<(), CatalogError> {
        let result = product::Entity::delete_by_id(id.to_string())
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound);
        }

        info!(id, "Deleted product");
        Ok(())
    }
}
