use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::catalog::{Catalog, SchemaCache};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub schema: Arc<SchemaCache>,
}

impl AppState {
    /// Catalog bound to the pool and the current schema snapshot.
    pub fn catalog(&self) -> Catalog<'_, DatabaseConnection> {
        Catalog::new(&self.db, self.schema.snapshot())
    }
}
