use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub const DATASET_LABEL: &str = "Sales";

pub const PALETTE: [&str; 12] = [
    "#42a5f5", "#66bb6a", "#ffa726", "#ec407a", "#ab47bc", "#26a69a", "#ff7043", "#7e57c2",
    "#26c6da", "#9ccc65", "#ffca28", "#8d6e63",
];

/// One sale as stored in the sales document.
///
/// Decoding is lenient so a single odd record cannot make the whole document
/// unreadable: a non-string date is read as its JSON text, a missing or
/// non-numeric count as `0` and a non-string category as none. This is a read
/// view only, the store never writes it back over the record it came from.
/// Unknown fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(default, deserialize_with = "lenient_string")]
    pub sale_date: String,

    #[serde(default, deserialize_with = "lenient_count")]
    pub sale_count: u64,

    #[serde(
        default,
        deserialize_with = "lenient_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sale {
    pub fn new(sale_date: impl Into<String>, sale_count: u64, category: Option<&str>) -> Self {
        Self {
            sale_date: sale_date.into(),
            sale_count,
            category: category.map(str::to_string),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesCollection {
    #[serde(default)]
    pub sales: Vec<Sale>,
}

/// A product record. Only `id` has meaning to the backend, every other field
/// belongs to the client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product {
    fields: Map<String, Value>,
}

impl Product {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Integer id, `None` when absent or not an integer (never matches a lookup).
    pub fn id(&self) -> Option<i64> {
        self.fields.get("id").and_then(Value::as_i64)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Shallow merge, patch keys win.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        self.fields.extend(patch);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductsCollection {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: Vec<String>,
}

impl TrendSeries {
    /// Builds a single-dataset series, one palette color per label.
    pub fn from_buckets(buckets: Vec<(String, u64)>) -> Self {
        let (labels, data): (Vec<String>, Vec<u64>) = buckets.into_iter().unzip();

        let background_color = (0..labels.len())
            .map(|i| PALETTE[i % PALETTE.len()].to_string())
            .collect();

        Self {
            labels,
            datasets: vec![Dataset {
                label: DATASET_LABEL.to_string(),
                data,
                background_color,
            }],
        }
    }
}

pub fn count_from_value(value: &Value) -> u64 {
    let count = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };

    count.unwrap_or_else(|| {
        warn!("Invalid saleCount {value}, counting as 0");
        0
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

fn lenient_category<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sale_decodes_camel_case() {
        let sale: Sale = serde_json::from_value(json!({
            "saleDate": "2024-01-10",
            "saleCount": 5,
            "category": "A",
            "productId": 7
        }))
        .unwrap();

        assert_eq!(sale.sale_date, "2024-01-10");
        assert_eq!(sale.sale_count, 5);
        assert_eq!(sale.category.as_deref(), Some("A"));
        assert_eq!(sale.extra.get("productId"), Some(&json!(7)));
    }

    #[test]
    fn test_sale_keeps_unknown_fields_on_encode() {
        let sale: Sale = serde_json::from_value(json!({
            "saleDate": "2024-01-10",
            "saleCount": 1,
            "note": "walk-in"
        }))
        .unwrap();

        let encoded = serde_json::to_value(&sale).unwrap();
        assert_eq!(
            encoded,
            json!({ "saleDate": "2024-01-10", "saleCount": 1, "note": "walk-in" })
        );
    }

    #[test]
    fn test_missing_or_bad_count_is_zero() {
        let missing: Sale = serde_json::from_value(json!({ "saleDate": "2024-01-10" })).unwrap();
        let text: Sale =
            serde_json::from_value(json!({ "saleDate": "2024-01-10", "saleCount": "three" }))
                .unwrap();
        let negative: Sale =
            serde_json::from_value(json!({ "saleDate": "2024-01-10", "saleCount": -2 })).unwrap();
        let whole_float: Sale =
            serde_json::from_value(json!({ "saleDate": "2024-01-10", "saleCount": 4.0 })).unwrap();

        assert_eq!(missing.sale_count, 0);
        assert_eq!(text.sale_count, 0);
        assert_eq!(negative.sale_count, 0);
        assert_eq!(whole_float.sale_count, 4);
    }

    #[test]
    fn test_odd_fields_do_not_break_document() {
        let doc: SalesCollection = serde_json::from_value(json!({
            "sales": [
                { "saleDate": 20240110, "saleCount": 1, "category": 3 },
                { "saleDate": "2024-01-11", "saleCount": 2 }
            ]
        }))
        .unwrap();

        assert_eq!(doc.sales.len(), 2);
        assert_eq!(doc.sales[0].sale_date, "20240110");
        assert_eq!(doc.sales[0].category, None);
    }

    #[test]
    fn test_empty_document_defaults() {
        let sales: SalesCollection = serde_json::from_value(json!({})).unwrap();
        let products: ProductsCollection = serde_json::from_value(json!({})).unwrap();

        assert!(sales.sales.is_empty());
        assert!(products.products.is_empty());
    }

    #[test]
    fn test_product_id_and_merge() {
        let mut product: Product =
            serde_json::from_value(json!({ "id": 3, "name": "Lamp", "price": 20 })).unwrap();
        assert_eq!(product.id(), Some(3));

        let patch = json!({ "price": 25, "stock": 4 });
        product.merge(patch.as_object().cloned().unwrap());

        assert_eq!(
            serde_json::to_value(&product).unwrap(),
            json!({ "id": 3, "name": "Lamp", "price": 25, "stock": 4 })
        );
    }

    #[test]
    fn test_product_string_id_never_matches() {
        let product: Product = serde_json::from_value(json!({ "id": "3" })).unwrap();
        assert_eq!(product.id(), None);
    }

    #[test]
    fn test_palette_cycles_past_twelve() {
        let buckets = (0..14).map(|i| (format!("b{i}"), i)).collect();
        let series = TrendSeries::from_buckets(buckets);
        let colors = &series.datasets[0].background_color;

        assert_eq!(colors.len(), 14);
        assert_eq!(colors[0], PALETTE[0]);
        assert_eq!(colors[11], PALETTE[11]);
        assert_eq!(colors[12], PALETTE[0]);
        assert_eq!(colors[13], PALETTE[1]);
    }

    #[test]
    fn test_series_encodes_chart_shape() {
        let series = TrendSeries::from_buckets(vec![("2024-01-10".to_string(), 8)]);

        assert_eq!(
            serde_json::to_value(&series).unwrap(),
            json!({
                "labels": ["2024-01-10"],
                "datasets": [{ "label": "Sales", "data": [8], "backgroundColor": ["#42a5f5"] }]
            })
        );
    }
}
