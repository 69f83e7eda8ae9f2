//! A newsletter sign-up.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Fields, Language, Schema, ValidationError};

/// One subscriber. The subscribe workflow keeps `email` unique, the store does not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSubscriber {
    pub email: String,
    #[serde(default)]
    pub language: Language,
}

impl Schema for NewsletterSubscriber {
    fn validate(payload: &Value) -> Result<Self, ValidationError> {
        let mut f = Fields::of(payload)?;
        let subscriber = NewsletterSubscriber {
            email: f.email("email"),
            language: f.literal_or("language", Language::default()),
        };
        f.finish(subscriber)
    }
}
