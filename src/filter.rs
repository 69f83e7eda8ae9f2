//! Equality and range predicates over stored documents.

use serde_json::{Map, Value};

/// A stored document: a JSON object without its storage identifier.
pub type Document = Map<String, Value>;

/// Condition on one document field.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// The field equals the value. Numbers compare numerically.
    Equals(Value),
    /// The field is a number within the inclusive bounds given.
    Range { gte: Option<f64>, lte: Option<f64> },
}

impl Predicate {
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Self::Equals(expected) => json_eq(value, expected),
            Self::Range { gte, lte } => match value.as_f64() {
                Some(n) => gte.is_none_or(|min| n >= min) && lte.is_none_or(|max| n <= max),
                None => false,
            },
        }
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Conjunction of per-field predicates. Empty matches every document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Predicate)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((field.to_owned(), Predicate::Equals(value.into())));
        self
    }

    /// Adds an inclusive range. With neither bound given nothing is added.
    pub fn range(mut self, field: &str, gte: Option<f64>, lte: Option<f64>) -> Self {
        if gte.is_some() || lte.is_some() {
            self.clauses.push((field.to_owned(), Predicate::Range { gte, lte }));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, Predicate)] {
        &self.clauses
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|(field, p)| p.matches(doc.get(field)))
    }
}
