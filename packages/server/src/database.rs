use std::time::Duration;

use sea_orm::sea_query::{
    ColumnDef, Expr, ForeignKey, ForeignKeyAction, Index, PostgresQueryBuilder, Table,
    TableCreateStatement,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::{product, product_image, product_review, product_service};

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url());

    // Set connection pool options
    opt.max_connections(config.pool_size)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    info!(
        host = %config.host,
        name = %config.name,
        pool_size = config.pool_size,
        "Database connected"
    );

    Ok(db)
}

/// Create the catalog tables if they do not exist yet.
///
/// Only the base product columns are created here; the optional ones are
/// added by `SchemaCache::ensure_columns`.
pub async fn ensure_tables<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    for stmt in [
        products_table(),
        product_images_table(),
        product_services_table(),
        product_reviews_table(),
    ] {
        db.execute_unprepared(&stmt.to_string(PostgresQueryBuilder))
            .await?;
    }
    info!("Ensured catalog tables exist");

    ensure_indexes(db).await;
    Ok(())
}

fn products_table() -> TableCreateStatement {
    Table::create()
        .table(product::Entity)
        .if_not_exists()
        .col(ColumnDef::new(product::Column::Id).text().not_null().primary_key())
        .col(ColumnDef::new(product::Column::Name).text().not_null())
        .col(ColumnDef::new(product::Column::Brand).text().null())
        .col(ColumnDef::new(product::Column::Category).text().null())
        .col(ColumnDef::new(product::Column::Price).double().not_null().default(0.0))
        .col(ColumnDef::new(product::Column::Stock).integer().not_null().default(0))
        .col(ColumnDef::new(product::Column::Colors).text().null())
        .col(ColumnDef::new(product::Column::Features).text().null())
        .col(
            ColumnDef::new(product::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

fn product_images_table() -> TableCreateStatement {
    Table::create()
        .table(product_image::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(product_image::Column::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(product_image::Column::ProductId).text().not_null())
        .col(ColumnDef::new(product_image::Column::Url).text().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_product_images_product")
                .from(product_image::Entity, product_image::Column::ProductId)
                .to(product::Entity, product::Column::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn product_services_table() -> TableCreateStatement {
    Table::create()
        .table(product_service::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(product_service::Column::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(product_service::Column::ProductId).text().not_null())
        .col(ColumnDef::new(product_service::Column::K).text().not_null())
        .col(ColumnDef::new(product_service::Column::V).text().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_product_services_product")
                .from(product_service::Entity, product_service::Column::ProductId)
                .to(product::Entity, product::Column::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn product_reviews_table() -> TableCreateStatement {
    Table::create()
        .table(product_review::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(product_review::Column::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(product_review::Column::ProductId).text().not_null())
        .col(ColumnDef::new(product_review::Column::Name).text().not_null())
        .col(ColumnDef::new(product_review::Column::Rating).double().not_null())
        .col(ColumnDef::new(product_review::Column::Comment).text().null())
        .col(
            ColumnDef::new(product_review::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_product_reviews_product")
                .from(product_review::Entity, product_review::Column::ProductId)
                .to(product::Entity, product::Column::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

/// Child lookups are always by `product_id`. Failures are logged, not fatal.
async fn ensure_indexes<C: ConnectionTrait>(db: &C) {
    let indexes = [
        Index::create()
            .if_not_exists()
            .name("idx_product_images_product")
            .table(product_image::Entity)
            .col(product_image::Column::ProductId)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_product_services_product")
            .table(product_service::Entity)
            .col(product_service::Column::ProductId)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_product_reviews_product_created")
            .table(product_review::Entity)
            .col(product_review::Column::ProductId)
            .col(product_review::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
    ];

    for stmt in indexes {
        if let Err(e) = db.execute_unprepared(&stmt).await {
            warn!("Failed to create index: {}", e);
        }
    }
}
