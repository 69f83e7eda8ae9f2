//! Entity shapes and payload validation.
//!
//! Each entity kind validates an untyped JSON payload into its typed form
//! via [`Schema::validate`]. Validation never stops at the first problem:
//! every offending field is reported as a [`Violation`] so the caller gets
//! the complete list in one 422 response.
//!
//! # Coercion rules
//! - Strings must be JSON strings.
//! - Numbers accept JSON numbers and numeric strings.
//! - Booleans accept JSON booleans, `0`/`1`, and the strings understood by
//!   [`parse_bool`].
//! - A missing field with a default takes the default. A field present as
//!   `null` is only accepted when the field is optional.
//! - Email addresses come back with their domain lowercased.
//! - Unknown fields are ignored.

mod collection;
mod contact;
mod email;
mod newsletter;
mod product;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use collection::Collection;
pub use contact::ContactMessage;
pub use newsletter::NewsletterSubscriber;
pub use product::Product;

/// Validates an untyped payload into a typed entity.
pub trait Schema: Sized {
    fn validate(payload: &Value) -> Result<Self, ValidationError>;
}

// ── Violations ────────────────────────────────────────────────────────────────

/// One segment of a violation location: a field name or a list index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loc {
    Field(String),
    Index(usize),
}

impl From<&str> for Loc {
    fn from(s: &str) -> Self { Self::Field(s.to_owned()) }
}

impl From<usize> for Loc {
    fn from(i: usize) -> Self { Self::Index(i) }
}

/// A single field that failed its constraint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub loc: Vec<Loc>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Violation {
    pub fn new(loc: Vec<Loc>, kind: &str, msg: impl Into<String>) -> Self {
        Self { loc, msg: msg.into(), kind: kind.to_owned() }
    }

    /// Violation located in the request body.
    pub fn body(field: &str, kind: &str, msg: impl Into<String>) -> Self {
        Self::new(vec!["body".into(), field.into()], kind, msg)
    }

    /// Violation located in the query string.
    pub fn query(param: &str, kind: &str, msg: impl Into<String>) -> Self {
        Self::new(vec!["query".into(), param.into()], kind, msg)
    }

    /// Last location segment, when it names a field.
    pub fn field(&self) -> Option<&str> {
        self.loc.iter().rev().find_map(|l| match l {
            Loc::Field(f) => Some(f.as_str()),
            Loc::Index(_) => None,
        })
    }
}

/// A payload that failed validation, with every violation found.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{} validation error(s), first at {}", .violations.len(), first_field(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn single(violation: Violation) -> Self {
        Self { violations: vec![violation] }
    }

    /// Whether any violation concerns `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.loc.iter().any(|l| *l == Loc::from(field)))
    }
}

fn first_field(violations: &[Violation]) -> &str {
    violations.first().and_then(Violation::field).unwrap_or("body")
}

// ── Fixed enumerations ────────────────────────────────────────────────────────

/// A closed set of string values.
pub trait Literal: Sized + Copy + 'static {
    const VALUES: &'static [Self];
    fn as_str(self) -> &'static str;

    fn parse(s: &str) -> Option<Self> {
        Self::VALUES.iter().copied().find(|v| v.as_str() == s)
    }

    /// `'a', 'b' or 'c'`
    fn expected() -> String {
        let quoted: Vec<String> = Self::VALUES.iter().map(|v| format!("'{}'", v.as_str())).collect();
        match quoted.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
            Some((last, _)) => last.clone(),
            None => String::new(),
        }
    }
}

/// Key of a jewelry line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKey {
    #[default]
    Acciaio,
    Argento,
    Pietre,
}

impl Literal for CollectionKey {
    const VALUES: &'static [Self] = &[Self::Acciaio, Self::Argento, Self::Pietre];

    fn as_str(self) -> &'static str {
        match self {
            Self::Acciaio => "acciaio",
            Self::Argento => "argento",
            Self::Pietre  => "pietre",
        }
    }
}

/// Base material of a piece.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Acciaio,
    Argento,
}

impl Literal for Material {
    const VALUES: &'static [Self] = &[Self::Acciaio, Self::Argento];

    fn as_str(self) -> &'static str {
        match self {
            Self::Acciaio => "acciaio",
            Self::Argento => "argento",
        }
    }
}

/// Language a visitor wrote in or wants mail in. Italian first.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    It,
    En,
}

impl Literal for Language {
    const VALUES: &'static [Self] = &[Self::It, Self::En];

    fn as_str(self) -> &'static str {
        match self {
            Self::It => "it",
            Self::En => "en",
        }
    }
}

// ── Lax scalar parsing ────────────────────────────────────────────────────────

/// Parses the boolean spellings accepted in query strings and bodies.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

/// Parses a finite real number.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

// ── Field reader ──────────────────────────────────────────────────────────────

/// Reads typed fields out of a JSON object while collecting violations.
///
/// Each accessor returns a placeholder when the field is invalid; the
/// placeholder is never observed because [`Fields::finish`] discards the
/// built value whenever a violation was recorded.
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
    violations: Vec<Violation>,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(payload: &'a Value) -> Result<Self, ValidationError> {
        match payload {
            Value::Object(map) => Ok(Self { map, violations: Vec::new() }),
            _ => Err(ValidationError::single(Violation::new(
                vec!["body".into()],
                "model_attributes_type",
                "Input should be a valid dictionary or object to extract fields from",
            ))),
        }
    }

    fn violate(&mut self, field: &str, kind: &str, msg: impl Into<String>) {
        self.violations.push(Violation::body(field, kind, msg));
    }

    fn missing(&mut self, field: &str) {
        self.violate(field, "missing", "Field required");
    }

    /// Present and not `null`.
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    fn as_string(&mut self, field: &str, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            _ => {
                self.violate(field, "string_type", "Input should be a valid string");
                String::new()
            }
        }
    }

    pub(crate) fn string(&mut self, field: &str) -> String {
        let map = self.map;
        match map.get(field) {
            None => {
                self.missing(field);
                String::new()
            }
            Some(value) => self.as_string(field, value),
        }
    }

    pub(crate) fn optional_string(&mut self, field: &str) -> Option<String> {
        let value = self.present(field)?;
        Some(self.as_string(field, value))
    }

    fn as_literal<T: Literal + Default>(&mut self, field: &str, value: &Value) -> T {
        match value.as_str().and_then(T::parse) {
            Some(v) => v,
            None => {
                self.violate(field, "literal_error", format!("Input should be {}", T::expected()));
                T::default()
            }
        }
    }

    pub(crate) fn literal<T: Literal + Default>(&mut self, field: &str) -> T {
        let map = self.map;
        match map.get(field) {
            None => {
                self.missing(field);
                T::default()
            }
            Some(value) => self.as_literal(field, value),
        }
    }

    pub(crate) fn literal_or<T: Literal + Default>(&mut self, field: &str, default: T) -> T {
        let map = self.map;
        match map.get(field) {
            None => default,
            Some(value) => self.as_literal(field, value),
        }
    }

    /// Required real number with an inclusive lower bound.
    pub(crate) fn number_at_least(&mut self, field: &str, min: f64) -> f64 {
        let map = self.map;
        let parsed = match map.get(field) {
            None => {
                self.missing(field);
                return min;
            }
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => match parse_number(s) {
                Some(n) => Some(n),
                None => {
                    self.violate(field, "float_parsing", "Input should be a valid number, unable to parse string as a number");
                    return min;
                }
            },
            Some(_) => None,
        };
        match parsed {
            Some(n) if n >= min => n,
            Some(_) => {
                self.violate(field, "greater_than_equal", format!("Input should be greater than or equal to {min}"));
                min
            }
            None => {
                self.violate(field, "float_type", "Input should be a valid number");
                min
            }
        }
    }

    pub(crate) fn bool_or(&mut self, field: &str, default: bool) -> bool {
        let map = self.map;
        let parsed = match map.get(field) {
            None => return default,
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Some(Value::String(s)) => parse_bool(s),
            Some(_) => None,
        };
        parsed.unwrap_or_else(|| {
            self.violate(field, "bool_type", "Input should be a valid boolean");
            default
        })
    }

    pub(crate) fn string_list_or_empty(&mut self, field: &str) -> Vec<String> {
        let map = self.map;
        match map.get(field) {
            None => Vec::new(),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => out.push(s.clone()),
                        _ => self.violations.push(Violation::new(
                            vec!["body".into(), field.into(), i.into()],
                            "string_type",
                            "Input should be a valid string",
                        )),
                    }
                }
                out
            }
            Some(_) => {
                self.violate(field, "list_type", "Input should be a valid list");
                Vec::new()
            }
        }
    }

    pub(crate) fn email(&mut self, field: &str) -> String {
        let value = self.string(field);
        if self.violations.iter().any(|v| v.field() == Some(field)) {
            return value;
        }
        match email::check(&value) {
            Ok(()) => email::normalize(&value),
            Err(reason) => {
                self.violate(field, "value_error", format!("value is not a valid email address: {reason}"));
                value
            }
        }
    }

    /// Returns `built` when no violation was recorded.
    pub(crate) fn finish<T>(self, built: T) -> Result<T, ValidationError> {
        if self.violations.is_empty() {
            Ok(built)
        } else {
            Err(ValidationError::new(self.violations))
        }
    }
}
