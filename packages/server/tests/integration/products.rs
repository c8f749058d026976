use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn health_pings_database() {
    let app = TestApp::spawn().await;

    for path in [routes::HEALTH, routes::API_HEALTH] {
        let res = app.get(path).await;
        assert_eq!(res.status, 200, "{path}: {}", res.text);
        assert_eq!(res.text, "ok");
    }
}

#[tokio::test]
async fn create_then_get_returns_defaults() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::PRODUCTS,
            &json!({
                "id": "s21-ultra",
                "name": "Galaxy S21 Ultra",
                "price": 1199,
                "colors": ["Black"],
            }),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body, json!({ "ok": true, "id": "s21-ultra" }));

    let res = app.get(&routes::product("s21-ultra")).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let p = &res.body;
    assert_eq!(p["id"], "s21-ultra");
    assert_eq!(p["name"], "Galaxy S21 Ultra");
    assert_eq!(p["price"], json!(1199));
    assert_eq!(p["stock"], 0);
    assert_eq!(p["colors"], json!(["Black"]));
    assert_eq!(p["features"], json!([]));
    assert_eq!(p["tags"], json!([]));
    assert_eq!(p["specs"], json!({}));
    assert_eq!(p["images"], json!([]));
    assert_eq!(p["services"], json!({}));
    assert_eq!(p["reviews"], json!([]));
    assert_eq!(p["active"], true);
    assert_eq!(p["featured"], false);
    assert_eq!(p["brand"], "");
    assert_eq!(p["release"], "");
    assert!(p["created_at"].is_string(), "created_at missing: {p}");
}

#[tokio::test]
async fn round_trip_keeps_normalized_fields() {
    let app = TestApp::spawn().await;

    app.create_product(json!({
        "id": "pixel-8",
        "name": "  Pixel 8  ",
        "brand": "Google",
        "category": "phones",
        "price": "699.5",
        "stock": "12",
        "colors": ["Obsidian", "", "Hazel"],
        "features": "[\"Tensor G3\"]",
        "specs": { "ram": "8GB", "storage": [128, 256] },
        "tags": ["android", "flagship"],
        "active": 0,
        "featured": "true",
        "release": "2023-10-04T00:00:00Z",
        "warranty": "2 years",
        "notes": "",
        "images": ["https://cdn.example.com/p8/front.jpg", { "url": "https://cdn.example.com/p8/back.jpg" }],
        "services": { "Battery": "89", "Unlock": "free" },
    }))
    .await;

    let res = app.get(&routes::product("pixel-8")).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let p = &res.body;
    assert_eq!(p["name"], "Pixel 8");
    assert_eq!(p["brand"], "Google");
    assert_eq!(p["price"].as_f64(), Some(699.5));
    assert_eq!(p["stock"], 12);
    assert_eq!(p["colors"], json!(["Obsidian", "Hazel"]));
    assert_eq!(p["features"], json!(["Tensor G3"]));
    assert_eq!(p["specs"], json!({ "ram": "8GB", "storage": [128, 256] }));
    assert_eq!(p["tags"], json!(["android", "flagship"]));
    assert_eq!(p["active"], false);
    assert_eq!(p["featured"], true);
    assert_eq!(p["release"], "2023-10-04");
    assert_eq!(p["warranty"], "2 years");
    assert_eq!(p["notes"], "");
    assert_eq!(
        p["images"],
        json!(["https://cdn.example.com/p8/front.jpg", "https://cdn.example.com/p8/back.jpg"])
    );
    assert_eq!(p["services"], json!({ "Battery": 89, "Unlock": "free" }));
}

#[tokio::test]
async fn upsert_is_idempotent() {
    let app = TestApp::spawn().await;
    let body = json!({
        "id": "iphone-15",
        "name": "iPhone 15",
        "price": 799,
        "images": ["https://cdn.example.com/i15/a.jpg", "https://cdn.example.com/i15/b.jpg"],
        "services": [{ "k": "Screen replacement", "v": 329 }],
    });

    app.create_product(body.clone()).await;
    let first = app.get(&routes::product("iphone-15")).await;
    app.create_product(body).await;
    let second = app.get(&routes::product("iphone-15")).await;

    assert_eq!(app.count("products", "id = 'iphone-15'").await, 1);
    assert_eq!(app.count("product_images", "product_id = 'iphone-15'").await, 2);
    assert_eq!(app.count("product_services", "product_id = 'iphone-15'").await, 1);
    assert_eq!(first.body["images"], second.body["images"]);
    assert_eq!(first.body["services"], second.body["services"]);
    assert_eq!(first.body["price"], second.body["price"]);
}

#[tokio::test]
async fn upsert_overwrites_columns_and_keeps_reviews() {
    let app = TestApp::spawn().await;
    app.create_product(json!({
        "id": "fold-5",
        "name": "Galaxy Z Fold 5",
        "price": 1799,
        "tags": ["foldable"],
        "images": ["https://cdn.example.com/fold/a.jpg"],
    }))
    .await;
    let res = app
        .post(&routes::reviews("fold-5"), &json!({ "name": "Dana", "rating": 4 }))
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    app.create_product(json!({ "id": "fold-5", "name": "Galaxy Z Fold 5 (2023)" }))
        .await;

    let p = app.get(&routes::product("fold-5")).await.body;
    assert_eq!(p["name"], "Galaxy Z Fold 5 (2023)");
    assert_eq!(p["price"].as_f64(), Some(0.0));
    assert_eq!(p["tags"], json!([]));
    assert_eq!(p["images"], json!([]));
    assert_eq!(p["reviews"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn create_requires_id_and_name() {
    let app = TestApp::spawn().await;

    for body in [
        json!({ "name": "No id" }),
        json!({ "id": "no-name" }),
        json!({ "id": "  ", "name": "Blank id" }),
    ] {
        let res = app.post(routes::PRODUCTS, &body).await;
        assert_eq!(res.status, 400, "{body}: {}", res.text);
        assert_eq!(res.body["error"], "id and name are required");
    }
    assert_eq!(app.count("products", "").await, 0);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.post_raw(routes::PRODUCTS, "{\"id\": \"x\",").await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert!(res.body["error"].is_string(), "{}", res.text);
}

#[tokio::test]
async fn get_missing_product_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::product("nope")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body, json!({ "error": "not found" }));
}

#[tokio::test]
async fn put_on_missing_product_creates_nothing() {
    let app = TestApp::spawn().await;
    app.create_simple_product("existing").await;

    let res = app
        .put(&routes::product("ghost"), &json!({ "name": "Ghost phone" }))
        .await;
    assert_eq!(res.status, 404, "{}", res.text);
    assert_eq!(res.body, json!({ "error": "not found" }));
    assert_eq!(app.count("products", "").await, 1);
}

#[tokio::test]
async fn put_updates_columns_and_only_given_children() {
    let app = TestApp::spawn().await;
    app.create_product(json!({
        "id": "nord-3",
        "name": "Nord 3",
        "price": 449,
        "images": ["https://cdn.example.com/nord/a.jpg"],
        "services": { "Battery": 59 },
    }))
    .await;

    let res = app
        .put(
            &routes::product("nord-3"),
            &json!({ "name": "Nord 3 5G", "price": 399, "stock": 4, "images": [] }),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body, json!({ "ok": true }));

    let p = app.get(&routes::product("nord-3")).await.body;
    assert_eq!(p["name"], "Nord 3 5G");
    assert_eq!(p["price"].as_f64(), Some(399.0));
    assert_eq!(p["stock"], 4);
    assert_eq!(p["images"], json!([]));
    assert_eq!(p["services"], json!({ "Battery": 59 }));
}

#[tokio::test]
async fn put_requires_name() {
    let app = TestApp::spawn().await;
    app.create_simple_product("x1").await;

    let res = app.put(&routes::product("x1"), &json!({ "name": " " })).await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.body["error"], "name is required");
}

#[tokio::test]
async fn delete_cascades_to_children() {
    let app = TestApp::spawn().await;
    app.create_product(json!({
        "id": "moto-g",
        "name": "Moto G",
        "images": ["https://cdn.example.com/moto/a.jpg"],
        "services": { "Battery": 39 },
    }))
    .await;
    app.post(&routes::reviews("moto-g"), &json!({ "name": "Sam", "rating": 3 }))
        .await;

    let res = app.delete(&routes::product("moto-g")).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body, json!({ "ok": true }));

    assert_eq!(app.get(&routes::product("moto-g")).await.status, 404);
    for table in ["product_images", "product_services", "product_reviews"] {
        assert_eq!(app.count(table, "product_id = 'moto-g'").await, 0, "{table}");
    }

    let res = app.delete(&routes::product("moto-g")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn list_is_newest_first_and_hydrated() {
    let app = TestApp::spawn().await;
    app.create_product(json!({
        "id": "old",
        "name": "Old phone",
        "images": ["https://cdn.example.com/old.jpg"],
    }))
    .await;
    app.create_simple_product("new").await;
    app.execute("UPDATE products SET created_at = now() - interval '1 day' WHERE id = 'old'")
        .await;

    let res = app.get(routes::PRODUCTS).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let products = res.body.as_array().expect("list should be an array");
    let ids: Vec<&str> = products.iter().filter_map(|p| p["id"].as_str()).collect();
    assert_eq!(ids, vec!["new", "old"]);
    assert_eq!(products[1]["images"], json!(["https://cdn.example.com/old.jpg"]));
    assert_eq!(products[0]["images"], json!([]));
}

#[tokio::test]
async fn malformed_stored_json_degrades_to_defaults() {
    let app = TestApp::spawn().await;
    app.create_simple_product("legacy").await;
    app.execute(
        "UPDATE products SET colors = 'not json', specs = '[1,2]', tags = NULL, \
         active = NULL WHERE id = 'legacy'",
    )
    .await;

    let res = app.get(&routes::product("legacy")).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["colors"], json!([]));
    assert_eq!(res.body["specs"], json!({}));
    assert_eq!(res.body["tags"], json!([]));
    assert_eq!(res.body["active"], true);
}
