//! A jewelry line shown on the storefront.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CollectionKey, Fields, Schema, ValidationError};

/// A jewelry line such as acciaio, argento or pietre.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub key: CollectionKey,
    pub name_it: String,
    pub name_en: String,
    pub tagline_it: String,
    pub tagline_en: String,
    pub description_it: String,
    pub description_en: String,
    /// URL of the hero image.
    #[serde(default)]
    pub hero_image: Option<String>,
}

impl Schema for Collection {
    fn validate(payload: &Value) -> Result<Self, ValidationError> {
        let mut f = Fields::of(payload)?;
        let collection = Collection {
            key: f.literal("key"),
            name_it: f.string("name_it"),
            name_en: f.string("name_en"),
            tagline_it: f.string("tagline_it"),
            tagline_en: f.string("tagline_en"),
            description_it: f.string("description_it"),
            description_en: f.string("description_en"),
            hero_image: f.optional_string("hero_image"),
        };
        f.finish(collection)
    }
}
