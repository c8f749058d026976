use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use sea_orm::{ConnectionTrait, DbErr};
use sea_orm::sea_query::PostgresQueryBuilder;
use tracing::{info, warn};

use super::statement;

/// Preferred name of the release-date column.
pub const RELEASE_COLUMN: &str = "release";
/// Name used by older deployments for the same column.
pub const LEGACY_RELEASE_COLUMN: &str = "release_date";

/// Product columns that may or may not exist in a given deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalColumn {
    Specs,
    Tags,
    Active,
    Featured,
    Warranty,
    Notes,
    /// Satisfied by either [`RELEASE_COLUMN`] or [`LEGACY_RELEASE_COLUMN`].
    Release,
}

impl OptionalColumn {
    pub const ALL: [OptionalColumn; 7] = [
        OptionalColumn::Specs,
        OptionalColumn::Tags,
        OptionalColumn::Active,
        OptionalColumn::Featured,
        OptionalColumn::Warranty,
        OptionalColumn::Notes,
        OptionalColumn::Release,
    ];

    /// Column name used when the column is added.
    pub fn name(self) -> &'static str {
        match self {
            OptionalColumn::Specs => "specs",
            OptionalColumn::Tags => "tags",
            OptionalColumn::Active => "active",
            OptionalColumn::Featured => "featured",
            OptionalColumn::Warranty => "warranty",
            OptionalColumn::Notes => "notes",
            OptionalColumn::Release => RELEASE_COLUMN,
        }
    }
}

/// Immutable snapshot of the columns currently present on `products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSchema {
    columns: BTreeSet<String>,
}

impl ProductSchema {
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Resolve the release-date alias: `release` wins over `release_date`.
    pub fn release_column(&self) -> Option<&'static str> {
        if self.has_column(RELEASE_COLUMN) {
            Some(RELEASE_COLUMN)
        } else if self.has_column(LEGACY_RELEASE_COLUMN) {
            Some(LEGACY_RELEASE_COLUMN)
        } else {
            None
        }
    }

    pub fn is_present(&self, column: OptionalColumn) -> bool {
        match column {
            OptionalColumn::Release => self.release_column().is_some(),
            other => self.has_column(other.name()),
        }
    }

    pub fn missing(&self) -> Vec<OptionalColumn> {
        OptionalColumn::ALL
            .into_iter()
            .filter(|c| !self.is_present(*c))
            .collect()
    }
}

/// Holds the current [`ProductSchema`] snapshot.
///
/// Refreshing swaps in a whole new snapshot; request handlers take one
/// `Arc` up front and use it for the rest of the request.
#[derive(Debug, Default)]
pub struct SchemaCache {
    current: RwLock<Arc<ProductSchema>>,
}

impl SchemaCache {
    pub fn new(schema: ProductSchema) -> Self {
        Self {
            current: RwLock::new(Arc::new(schema)),
        }
    }

    pub fn snapshot(&self) -> Arc<ProductSchema> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    fn replace(&self, schema: ProductSchema) {
        let schema = Arc::new(schema);
        match self.current.write() {
            Ok(mut guard) => *guard = schema,
            Err(poisoned) => *poisoned.into_inner() = schema,
        }
    }

    /// Re-read the column list of `products` and publish it as the new snapshot.
    pub async fn refresh<C: ConnectionTrait>(&self, conn: &C) -> Result<Arc<ProductSchema>, DbErr> {
        let rows = conn.query_all_raw(statement::list_product_columns()).await?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            columns.push(row.try_get::<String>("", "column_name")?);
        }

        let schema = ProductSchema::from_columns(columns);
        let missing: Vec<&str> = schema.missing().into_iter().map(OptionalColumn::name).collect();
        info!(
            release_column = schema.release_column().unwrap_or("none"),
            missing = ?missing,
            "Product schema refreshed"
        );

        self.replace(schema);
        Ok(self.snapshot())
    }

    /// Add every missing optional column, then refresh.
    ///
    /// A column that turns out to exist already counts as success. Any other
    /// failure (typically missing DDL privileges) is logged and the column
    /// stays absent for the lifetime of the process.
    pub async fn ensure_columns<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> Result<Arc<ProductSchema>, DbErr> {
        let before = self.refresh(conn).await?;

        for column in before.missing() {
            let stmt = statement::add_product_column(column).to_string(PostgresQueryBuilder);
            match conn.execute_unprepared(&stmt).await {
                Ok(_) => info!(column = column.name(), "Added product column"),
                Err(e) if is_duplicate_column(&e) => {
                    info!(column = column.name(), "Product column already exists")
                }
                Err(e) => warn!(
                    column = column.name(),
                    error = %e,
                    "Failed to add product column, continuing without it"
                ),
            }
        }

        self.refresh(conn).await
    }
}

/// Postgres reports SQLSTATE 42701 (`duplicate_column`) as
/// `column "x" of relation "products" already exists`.
fn is_duplicate_column(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("42701") || msg.contains("already exists")
}
