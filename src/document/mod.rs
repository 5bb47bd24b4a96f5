//! Nested key/value tree built for every record.
//!
//! A [`Document`] maps path segments to either a scalar [`Value`] or another
//! document. Keys are kept sorted so every output format emits them in the
//! same order.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer, ser::Error};

/// Separator between the segments of a property path.
pub const PATH_SEPARATOR: char = '.';

/// A node of a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Document(Document),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(value) => serializer.serialize_str(value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) if !value.is_finite() => {
                Err(S::Error::custom(format!("{} has no serialized form", value)))
            }
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Document(document) => document.serialize(serializer),
        }
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        Value::Document(document)
    }
}

/// One record's worth of output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Writes `value` at a dotted `property` path such as `a.b.c`.
    ///
    /// Intermediate documents are created on demand and reused when already
    /// present, so `a.b` and `a.c` end up side by side under `a`. A scalar
    /// sitting where an intermediate document is needed gets replaced by a
    /// fresh document. The leaf itself is last-write-wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_mapper::document::{Document, Value};
    ///
    /// let mut document = Document::new();
    /// document.set("a.b", Value::Int(1));
    /// document.set("a.c", Value::Bool(true));
    ///
    /// assert_eq!(
    ///     serde_json::to_string(&document).unwrap(),
    ///     r#"{"a":{"b":1,"c":true}}"#
    /// );
    /// ```
    pub fn set(&mut self, property: &str, value: Value) {
        let segments: Vec<&str> = property.split(PATH_SEPARATOR).collect();
        self.set_path(&segments, value);
    }

    /// Same as [`Document::set`] with the path already split into segments.
    pub fn set_path(&mut self, segments: &[&str], value: Value) {
        match segments {
            [] => {}
            [leaf] => {
                self.0.insert((*leaf).to_owned(), value);
            }
            [head, rest @ ..] => {
                let node = self
                    .0
                    .entry((*head).to_owned())
                    .or_insert_with(|| Value::Document(Document::new()));

                if !matches!(node, Value::Document(_)) {
                    *node = Value::Document(Document::new());
                }

                if let Value::Document(child) = node {
                    child.set_path(rest, value);
                }
            }
        }
    }
}
