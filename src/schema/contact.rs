//! A message left through the contact form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Fields, Language, Schema, ValidationError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub language: Language,
}

impl Schema for ContactMessage {
    fn validate(payload: &Value) -> Result<Self, ValidationError> {
        let mut f = Fields::of(payload)?;
        let message = ContactMessage {
            name: f.string("name"),
            email: f.email("email"),
            message: f.string("message"),
            language: f.literal_or("language", Language::default()),
        };
        f.finish(message)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn language_defaults_to_italian() {
        let m = ContactMessage::validate(&json!({
            "name": "Giulia",
            "email": "giulia@lonaire.it",
            "message": "Ciao!",
        }))
        .unwrap();
        assert_eq!(m.language, Language::It);
    }

    #[test]
    fn malformed_email_is_a_value_error() {
        let err = ContactMessage::validate(&json!({
            "name": "Giulia",
            "email": "giulia-at-lonaire",
            "message": "Ciao!",
            "language": "fr",
        }))
        .unwrap_err();
        let kinds: Vec<&str> = err.violations.iter().map(|v| v.kind.as_str()).collect();
        assert_eq!(kinds, vec!["value_error", "literal_error"]);
    }
}
