use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use reqwest::Client;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use serde_json::Value;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use catalog_server::catalog::SchemaCache;
use catalog_server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig};
use catalog_server::state::AppState;

/// PostgreSQL container shared across all tests in this binary.
static SHARED_PG: OnceCell<(ContainerAsync<Postgres>, u16)> = OnceCell::const_new();

/// Monotonic counter for unique database names.
static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Container ID for atexit cleanup.
static CONTAINER_ID: OnceLock<String> = OnceLock::new();

/// Template with every optional product column in place.
const FULL_TEMPLATE: &str = "template_full";
/// Template with only the base product columns.
const BARE_TEMPLATE: &str = "template_bare";

extern "C" fn cleanup_container() {
    if let Some(id) = CONTAINER_ID.get() {
        let _ = std::process::Command::new("docker")
            .args(["rm", "-f", "-v", id])
            .output();
    }
}

fn database_config(port: u16, name: &str) -> DatabaseConfig {
    DatabaseConfig {
        url: None,
        host: "127.0.0.1".to_string(),
        port,
        user: "postgres".to_string(),
        password: "postgres".to_string(),
        name: name.to_string(),
        pool_size: 5,
    }
}

async fn admin_execute(port: u16, sql: String) {
    let admin_db = Database::connect(ConnectOptions::new(database_config(port, "postgres").url()))
        .await
        .expect("Failed to connect to admin database");
    admin_db
        .execute_raw(Statement::from_string(DbBackend::Postgres, sql))
        .await
        .expect("Admin statement failed");
}

/// Start (or reuse) the shared PostgreSQL container, create and initialize
/// both template databases, and return the host port.
async fn shared_pg_port() -> u16 {
    let (_, port) = SHARED_PG
        .get_or_init(|| async {
            let container = Postgres::default()
                .start()
                .await
                .expect("Failed to start PostgreSQL container");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("Failed to get PostgreSQL port");

            let _ = CONTAINER_ID.set(container.id().to_string());

            // The `watchdog` feature handles signal-based
            // cleanup (Ctrl+C), but normal process exit doesn't trigger `Drop` on statics.
            unsafe { libc::atexit(cleanup_container) };

            for template in [FULL_TEMPLATE, BARE_TEMPLATE] {
                admin_execute(port, format!("CREATE DATABASE \"{template}\"")).await;

                let db = catalog_server::database::init_db(&database_config(port, template))
                    .await
                    .expect("Failed to connect to template database");
                catalog_server::database::ensure_tables(&db)
                    .await
                    .expect("Failed to create catalog tables");
                if template == FULL_TEMPLATE {
                    SchemaCache::default()
                        .ensure_columns(&db)
                        .await
                        .expect("Failed to add optional product columns");
                }
                db.close().await.expect("Failed to close template connection");
            }

            (container, port)
        })
        .await;
    *port
}

pub mod routes {
    pub const HEALTH: &str = "/health";
    pub const API_HEALTH: &str = "/api/health";
    pub const PRODUCTS: &str = "/api/products";

    pub fn product(id: &str) -> String {
        format!("/api/products/{id}")
    }

    pub fn images(id: &str) -> String {
        format!("/api/products/{id}/images")
    }

    pub fn image(id: &str, image_id: i64) -> String {
        format!("/api/products/{id}/images/{image_id}")
    }

    pub fn services(id: &str) -> String {
        format!("/api/products/{id}/services")
    }

    pub fn service(id: &str, service_id: i64) -> String {
        format!("/api/products/{id}/services/{service_id}")
    }

    pub fn reviews(id: &str) -> String {
        format!("/api/products/{id}/reviews")
    }

    pub fn review(id: &str, review_id: i64) -> String {
        format!("/api/products/{id}/reviews/{review_id}")
    }
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub schema: Arc<SchemaCache>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    /// Server over a database that has every optional product column.
    pub async fn spawn() -> Self {
        Self::spawn_from(FULL_TEMPLATE).await
    }

    /// Server over a database whose `products` table has only the base columns.
    pub async fn spawn_bare() -> Self {
        Self::spawn_from(BARE_TEMPLATE).await
    }

    async fn spawn_from(template: &str) -> Self {
        let port = shared_pg_port().await;
        let db_name = format!("test_{}", DB_COUNTER.fetch_add(1, Ordering::Relaxed));

        admin_execute(
            port,
            format!("CREATE DATABASE \"{db_name}\" TEMPLATE \"{template}\""),
        )
        .await;

        let database = database_config(port, &db_name);
        let db = catalog_server::database::init_db(&database)
            .await
            .expect("Failed to connect to test database");

        let schema = Arc::new(SchemaCache::default());
        schema
            .refresh(&db)
            .await
            .expect("Failed to read product schema");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database,
        };

        let state = AppState {
            db: db.clone(),
            config: app_config,
            schema: Arc::clone(&schema),
        };

        let app = catalog_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            schema,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Run a statement directly against this test's database.
    pub async fn execute(&self, sql: &str) {
        self.db
            .execute_unprepared(sql)
            .await
            .unwrap_or_else(|e| panic!("Failed to execute `{sql}`: {e}"));
    }

    /// Count rows of `table` matching an optional `WHERE` clause.
    pub async fn count(&self, table: &str, filter: &str) -> i64 {
        let where_clause = if filter.is_empty() {
            String::new()
        } else {
            format!(" WHERE {filter}")
        };
        let row = self
            .db
            .query_one_raw(Statement::from_string(
                DbBackend::Postgres,
                format!("SELECT COUNT(*) AS n FROM {table}{where_clause}"),
            ))
            .await
            .expect("Count query failed")
            .expect("Count query returned no row");
        row.try_get::<i64>("", "n").expect("Count should be an integer")
    }

    /// Re-read the `products` columns after altering the table by hand.
    pub async fn refresh_schema(&self) {
        self.schema
            .refresh(&self.db)
            .await
            .expect("Failed to refresh product schema");
    }

    /// Upsert a product via the API and assert it succeeded.
    pub async fn create_product(&self, body: Value) {
        let res = self.post(routes::PRODUCTS, &body).await;
        assert_eq!(res.status, 201, "create_product failed: {}", res.text);
    }

    /// Minimal valid product body.
    pub async fn create_simple_product(&self, id: &str) {
        self.create_product(serde_json::json!({ "id": id, "name": format!("Product {id}") }))
            .await;
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// Integer id stored under `key` in the body, e.g. `image_id`.
    pub fn id(&self, key: &str) -> i64 {
        self.body[key]
            .as_i64()
            .unwrap_or_else(|| panic!("response body should contain '{key}': {}", self.text))
    }
}
