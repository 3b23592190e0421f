use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use trends::{Product, Sale, parse_sale_timestamp};

use crate::error::AppError::{self, MalformedPayload, NotFound};

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid regex"));

/// Leading integer of a path segment, `"12abc"` reads as `12`. No digits means no such item.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    LEADING_INT
        .captures(raw)
        .and_then(|captures| captures[1].parse().ok())
        .ok_or(NotFound)
}

fn into_object(payload: Value, what: &str) -> Result<Map<String, Value>, AppError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(MalformedPayload(format!("{what} must be a JSON object"))),
    }
}

fn check_id(fields: &Map<String, Value>, required: bool) -> Result<(), AppError> {
    match fields.get("id") {
        Some(id) if id.as_i64().is_some() => Ok(()),
        None if !required => Ok(()),
        _ => Err(MalformedPayload("id must be an integer".to_string())),
    }
}

pub fn product_from_payload(payload: Value) -> Result<Product, AppError> {
    let fields = into_object(payload, "product")?;
    check_id(&fields, true)?;

    Ok(Product::from_fields(fields))
}

pub fn patch_from_payload(payload: Value) -> Result<Map<String, Value>, AppError> {
    let fields = into_object(payload, "update")?;
    check_id(&fields, false)?;

    Ok(fields)
}

pub fn sale_from_payload(payload: Value) -> Result<Sale, AppError> {
    let fields = into_object(payload, "sale")?;

    let date = fields
        .get("saleDate")
        .and_then(Value::as_str)
        .ok_or_else(|| MalformedPayload("saleDate must be a string".to_string()))?;
    parse_sale_timestamp(date).map_err(|e| MalformedPayload(e.to_string()))?;

    if fields.get("saleCount").and_then(Value::as_u64).is_none() {
        return Err(MalformedPayload(
            "saleCount must be a non-negative integer".to_string(),
        ));
    }

    match fields.get("category") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => return Err(MalformedPayload("category must be a string".to_string())),
    }

    Ok(serde_json::from_value(Value::Object(fields))?)
}
