//! An individual piece for sale.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CollectionKey, Fields, Material, Schema, ValidationError};

/// An individual jewelry piece.
///
/// `collection_key` names a [`Collection`](super::Collection) by key; nothing
/// checks that the collection exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub title_it: String,
    pub title_en: String,
    #[serde(default)]
    pub description_it: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    pub material: Material,
    /// Free text, e.g. zircone or perla.
    #[serde(default)]
    pub stone: Option<String>,
    pub price: f64,
    #[serde(default = "available_by_default")]
    pub available: bool,
    #[serde(default)]
    pub images: Vec<String>,
    pub collection_key: CollectionKey,
}

fn available_by_default() -> bool {
    true
}

impl Schema for Product {
    fn validate(payload: &Value) -> Result<Self, ValidationError> {
        let mut f = Fields::of(payload)?;
        let product = Product {
            sku: f.string("sku"),
            title_it: f.string("title_it"),
            title_en: f.string("title_en"),
            description_it: f.optional_string("description_it"),
            description_en: f.optional_string("description_en"),
            material: f.literal("material"),
            stone: f.optional_string("stone"),
            price: f.number_at_least("price", 0.0),
            available: f.bool_or("available", available_by_default()),
            images: f.string_list_or_empty("images"),
            collection_key: f.literal("collection_key"),
        };
        f.finish(product)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload() -> Value {
        json!({
            "sku": "LN-AR-001",
            "title_it": "Anello Luna",
            "title_en": "Moon Ring",
            "material": "argento",
            "price": 49,
            "collection_key": "argento",
        })
    }

    #[test]
    fn defaults_fill_in_missing_fields() {
        let p = Product::validate(&payload()).unwrap();
        assert!(p.available);
        assert!(p.images.is_empty());
        assert_eq!(p.price, 49.0);
        assert_eq!(p.stone, None);
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut p = payload();
        p["price"] = json!(-0.01);
        let err = Product::validate(&p).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].kind, "greater_than_equal");
        assert!(err.mentions("price"));
    }

    #[test]
    fn zero_price_is_allowed() {
        let mut p = payload();
        p["price"] = json!(0);
        assert_eq!(Product::validate(&p).unwrap().price, 0.0);
    }

    #[test]
    fn numeric_string_price_is_coerced() {
        let mut p = payload();
        p["price"] = json!("19.90");
        assert_eq!(Product::validate(&p).unwrap().price, 19.9);
    }

    #[test]
    fn enumerations_are_closed() {
        let mut p = payload();
        p["material"] = json!("pietre");
        p["collection_key"] = json!("oro");
        let err = Product::validate(&p).unwrap_err();
        assert!(err.mentions("material"));
        assert!(err.mentions("collection_key"));
        assert_eq!(err.violations[0].msg, "Input should be 'acciaio' or 'argento'");
    }

    #[test]
    fn non_string_image_is_located_by_index() {
        let mut p = payload();
        p["images"] = json!(["a.jpg", 3]);
        let err = Product::validate(&p).unwrap_err();
        assert_eq!(
            serde_json::to_value(&err.violations[0].loc).unwrap(),
            json!(["body", "images", 1])
        );
    }

    #[test]
    fn null_is_only_accepted_for_optional_fields() {
        let mut p = payload();
        p["stone"] = Value::Null;
        p["available"] = Value::Null;
        let err = Product::validate(&p).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.mentions("available"));
    }
}
