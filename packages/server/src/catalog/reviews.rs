use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use super::normalize::coerce_number;
use super::{Catalog, CatalogError};
use crate::entity::product_review;
use crate::models::review::AddReviewRequest;

impl<C: ConnectionTrait> Catalog<'_, C> {
    /// Append a review. Name must be non-empty and rating present and nonzero.
    pub async fn add_review(
        &self,
        product_id: &str,
        request: &AddReviewRequest,
    ) -> Result<i32, CatalogError> {
        let name = request.name.as_deref().map(str::trim).unwrap_or_default();
        let rating = request
            .rating
            .as_ref()
            .map(|r| coerce_number(Some(r)))
            .filter(|r| *r != 0.0);
        let Some(rating) = rating.filter(|_| !name.is_empty()) else {
            return Err(CatalogError::Validation("name and rating are required".into()));
        };
        self.ensure_product_exists(product_id).await?;

        let comment = request
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let model = product_review::ActiveModel {
            product_id: Set(product_id.to_string()),
            name: Set(name.to_string()),
            rating: Set(rating),
            comment: Set(comment),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(model.id)
    }

    pub async fn delete_review(&self, product_id: &str, review_id: i32) -> Result<(), CatalogError> {
        let result = product_review::Entity::delete_many()
            .filter(product_review::Column::Id.eq(review_id))
            .filter(product_review::Column::ProductId.eq(product_id))
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }
}
