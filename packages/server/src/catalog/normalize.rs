//! Conversions between stored/client values and canonical product shapes.
//!
//! Nothing in here fails: corrupt historical rows and sloppy payloads degrade
//! to empty collections, zero, `false`/`true` defaults or empty strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Number, Value};

use super::statement::ProductRecord;
use crate::models::product::{Product, ProductPayload};

/// A stored `products` row, one key per column that exists in the table.
pub type ProductRow = Map<String, Value>;

/// Build the canonical product from a stored row. Child collections are left
/// empty; see [`super::read`] for hydration.
pub fn normalize_product(row: &ProductRow) -> Product {
    let release = present(row.get("release")).or_else(|| present(row.get("release_date")));

    Product {
        id: text(row.get("id")),
        name: text(row.get("name")),
        brand: text(row.get("brand")),
        category: text(row.get("category")),
        price: coerce_number(row.get("price")),
        stock: coerce_number(row.get("stock")).trunc() as i64,
        colors: json_list(row.get("colors")),
        features: json_list(row.get("features")),
        specs: json_object(row.get("specs")),
        tags: json_list(row.get("tags")),
        active: coerce_bool(row.get("active"), true),
        featured: coerce_bool(row.get("featured"), false),
        release: format_release(release),
        warranty: text(row.get("warranty")),
        notes: text(row.get("notes")),
        created_at: row.get("created_at").and_then(parse_timestamp),
        images: Vec::new(),
        services: Map::new(),
        reviews: Vec::new(),
    }
}

/// Derive the storable column values from a client payload.
pub fn normalize_payload(payload: &ProductPayload) -> ProductRecord {
    ProductRecord {
        name: payload.name.as_deref().unwrap_or_default().trim().to_string(),
        brand: optional_text(payload.brand.as_deref()),
        category: optional_text(payload.category.as_deref()),
        price: coerce_number(payload.price.as_ref()).max(0.0),
        // `as` saturates, so absurd stock values clamp to the i32 range.
        stock: coerce_number(payload.stock.as_ref()).trunc() as i32,
        colors: json_list(payload.colors.as_ref()),
        features: json_list(payload.features.as_ref()),
        specs: json_object(payload.specs.as_ref()),
        tags: json_list(payload.tags.as_ref()),
        active: coerce_bool(payload.active.as_ref(), true),
        featured: coerce_bool(payload.featured.as_ref(), false),
        release: parse_release(
            present(payload.release.as_ref()).or_else(|| present(payload.release_date.as_ref())),
        ),
        warranty: optional_text(payload.warranty.as_deref()),
        notes: optional_text(payload.notes.as_deref()),
    }
}

/// Render a service value the way clients expect it: a number when the text
/// trims to a finite number, otherwise the original string.
pub fn maybe_number(value: &str) -> Value {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Value::String(value.to_string());
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        _ => Value::String(value.to_string()),
    }
}

/// Numbers and finite numeric strings; anything else is 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Booleans, `0`/`1` numbers and `"true"`/`"false"`/`"1"`/`"0"` strings.
/// Missing, null or unrecognised values yield `default`.
pub fn coerce_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(default),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => default,
        },
        _ => default,
    }
}

/// A string list from either a JSON array or JSON-encoded array text.
///
/// Scalars inside the array are stringified; empty strings, nulls and nested
/// values are dropped.
pub fn json_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => string_items(items),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => string_items(&items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// An object from either a JSON object or JSON-encoded object text.
pub fn json_object(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

/// Format a date-like value as `YYYY-MM-DD`, cutting ISO timestamps at `T`.
pub fn format_release(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.split('T').next().unwrap_or_default().trim().to_string(),
        _ => String::new(),
    }
}

/// Parse a date-like value for storage. Unparsable input stores `NULL`.
pub fn parse_release(value: Option<&Value>) -> Option<NaiveDate> {
    let formatted = format_release(value);
    NaiveDate::parse_from_str(&formatted, "%Y-%m-%d").ok()
}

/// Canonical JSON text for a list column.
pub fn list_to_json_text(items: &[String]) -> String {
    Value::from(items.to_vec()).to_string()
}

/// Canonical JSON text for an object column.
pub fn object_to_json_text(map: &Map<String, Value>) -> String {
    Value::Object(map.clone()).to_string()
}

/// String-coerce a scalar for the text `v` column of a service entry.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(scalar_text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn text(value: Option<&Value>) -> String {
    value.and_then(scalar_text).unwrap_or_default()
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
