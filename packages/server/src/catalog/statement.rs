//! SQL for the `products` table.
//!
//! The set of product columns differs between deployments, so statements
//! are assembled here from a [`ProductSchema`] snapshot. This is the only
//! place that turns column names into SQL identifiers; every value is bound
//! as a parameter.

use chrono::NaiveDate;
use sea_orm::sea_query::{
    Alias, ColumnDef, Expr, ExprTrait, InsertStatement, OnConflict, Query, Table,
    TableAlterStatement, UpdateStatement,
};
use sea_orm::{DbBackend, Statement, Value};
use serde_json::{Map, Value as Json};

use super::normalize::{list_to_json_text, object_to_json_text};
use super::schema::{OptionalColumn, ProductSchema};

pub const PRODUCTS_TABLE: &str = "products";

/// Normalized column values of one product, ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub colors: Vec<String>,
    pub features: Vec<String>,
    pub specs: Map<String, Json>,
    pub tags: Vec<String>,
    pub active: bool,
    pub featured: bool,
    pub release: Option<NaiveDate>,
    pub warranty: Option<String>,
    pub notes: Option<String>,
}

/// Column/value pairs to write for `record`, excluding `id`.
///
/// Base columns always come first, then the optional columns the schema
/// has, then the resolved release column if there is one.
pub fn product_columns(schema: &ProductSchema, record: &ProductRecord) -> Vec<(&'static str, Value)> {
    let mut columns: Vec<(&'static str, Value)> = vec![
        ("name", record.name.clone().into()),
        ("brand", record.brand.clone().into()),
        ("category", record.category.clone().into()),
        ("price", record.price.into()),
        ("stock", record.stock.into()),
        ("colors", list_to_json_text(&record.colors).into()),
        ("features", list_to_json_text(&record.features).into()),
    ];

    for column in OptionalColumn::ALL {
        if column == OptionalColumn::Release || !schema.is_present(column) {
            continue;
        }
        let value: Value = match column {
            OptionalColumn::Specs => object_to_json_text(&record.specs).into(),
            OptionalColumn::Tags => list_to_json_text(&record.tags).into(),
            OptionalColumn::Active => record.active.into(),
            OptionalColumn::Featured => record.featured.into(),
            OptionalColumn::Warranty => record.warranty.clone().into(),
            OptionalColumn::Notes => record.notes.clone().into(),
            OptionalColumn::Release => continue,
        };
        columns.push((column.name(), value));
    }

    if let Some(release) = schema.release_column() {
        columns.push((release, record.release.into()));
    }

    columns
}

/// `INSERT ... ON CONFLICT (id) DO UPDATE` over exactly the inserted columns.
pub fn upsert_product(schema: &ProductSchema, id: &str, record: &ProductRecord) -> InsertStatement {
    let columns = product_columns(schema, record);
    let names: Vec<&'static str> = columns.iter().map(|(name, _)| *name).collect();

    let mut values: Vec<Value> = Vec::with_capacity(columns.len() + 1);
    values.push(id.into());
    values.extend(columns.into_iter().map(|(_, value)| value));

    Query::insert()
        .into_table(Alias::new(PRODUCTS_TABLE))
        .columns(std::iter::once("id").chain(names.iter().copied()).map(Alias::new))
        .values_panic(values.into_iter().map(Expr::val))
        .on_conflict(
            OnConflict::column(Alias::new("id"))
                .update_columns(names.iter().copied().map(Alias::new))
                .to_owned(),
        )
        .to_owned()
}

/// `UPDATE products SET ... WHERE id = $id`; never creates a row.
pub fn update_product(schema: &ProductSchema, id: &str, record: &ProductRecord) -> UpdateStatement {
    let values = product_columns(schema, record)
        .into_iter()
        .map(|(name, value)| (Alias::new(name), Expr::val(value)));

    Query::update()
        .table(Alias::new(PRODUCTS_TABLE))
        .values(values)
        .and_where(Expr::col(Alias::new("id")).eq(id))
        .to_owned()
}

/// One product row as a JSON object keyed by column name.
///
/// `row_to_json` keeps the statement independent of which optional columns
/// exist.
pub fn select_product(id: &str) -> Statement {
    Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT row_to_json(p) AS product FROM products p WHERE p.id = $1",
        [id.into()],
    )
}

/// All product rows, newest first.
pub fn select_products() -> Statement {
    Statement::from_string(
        DbBackend::Postgres,
        "SELECT row_to_json(p) AS product FROM products p ORDER BY p.created_at DESC, p.id",
    )
}

/// Column names of `products` in the schemas on the search path.
pub fn list_product_columns() -> Statement {
    Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT column_name::text AS column_name FROM information_schema.columns \
         WHERE table_schema = ANY (current_schemas(false)) AND table_name = $1",
        [PRODUCTS_TABLE.into()],
    )
}

/// `ALTER TABLE products ADD COLUMN ...` for one optional column.
pub fn add_product_column(column: OptionalColumn) -> TableAlterStatement {
    let mut def = ColumnDef::new(Alias::new(column.name()));
    match column {
        OptionalColumn::Specs
        | OptionalColumn::Tags
        | OptionalColumn::Warranty
        | OptionalColumn::Notes => def.text().null(),
        OptionalColumn::Active => def.boolean().default(true),
        OptionalColumn::Featured => def.boolean().default(false),
        OptionalColumn::Release => def.date().null(),
    };

    Table::alter()
        .table(Alias::new(PRODUCTS_TABLE))
        .add_column(def)
        .to_owned()
}
