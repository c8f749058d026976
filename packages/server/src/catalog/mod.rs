//! Product aggregate: normalization, schema probing, hydration and
//! replace-all synchronization of child collections.

pub mod children;
pub mod normalize;
pub mod read;
pub mod reviews;
pub mod schema;
pub mod statement;
pub mod write;

use std::sync::Arc;

use sea_orm::DbErr;

pub use schema::{ProductSchema, SchemaCache};

/// Outcome of a catalog operation that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Client input is missing a required field.
    #[error("{0}")]
    Validation(String),
    /// The product or child row does not exist (or belongs to another product).
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Catalog operations over one connection and one schema snapshot.
///
/// Cheap to build; handlers create one per request.
pub struct Catalog<'a, C> {
    conn: &'a C,
    schema: Arc<ProductSchema>,
}

impl<'a, C> Catalog<'a, C> {
    pub fn new(conn: &'a C, schema: Arc<ProductSchema>) -> Self {
        Self { conn, schema }
    }
}
