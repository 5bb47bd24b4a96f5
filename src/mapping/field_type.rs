use std::fmt;

use serde::Deserialize;

use crate::{document::Value, error::MappingError};

/// Declared type of a mapped column or calculated field.
///
/// Parsing is lenient: any name other than `int`, `float` or `bool` (including
/// a missing type) falls back to [`FieldType::String`], which passes the raw
/// cell through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum FieldType {
    #[default]
    String,
    Int,
    Float,
    Bool,
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        FieldType::from(name.as_str())
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        match name {
            "int" => FieldType::Int,
            "float" => FieldType::Float,
            "bool" => FieldType::Bool,
            _ => FieldType::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
        };
        f.write_str(name)
    }
}

impl FieldType {
    /// Converts a raw cell into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Coercion`] when `raw` is not a valid literal of
    /// the declared type. The error is never embedded in the document.
    /// Floats must be finite: `NaN` and infinities have no JSON literal.
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_mapper::document::Value;
    /// use csv_mapper::mapping::FieldType;
    ///
    /// assert_eq!(FieldType::Int.coerce("12").unwrap(), Value::Int(12));
    /// assert_eq!(FieldType::Bool.coerce("true").unwrap(), Value::Bool(true));
    /// assert!(FieldType::Int.coerce("x").is_err());
    /// ```
    pub fn coerce(self, raw: &str) -> Result<Value, MappingError> {
        let coerced = match self {
            FieldType::String => Ok(Value::String(raw.to_owned())),
            FieldType::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| e.to_string()),
            FieldType::Float => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Value::Float(value)),
                Ok(_) => Err("not a finite number".to_owned()),
                Err(e) => Err(e.to_string()),
            },
            FieldType::Bool => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| "invalid boolean literal".to_owned()),
        };

        coerced.map_err(|reason| MappingError::Coercion {
            field_type: self,
            value: raw.to_owned(),
            reason,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
