//! Mapping configuration consumed by a run.
//!
//! A configuration is a JSON document with three sections:
//!
//! - `mapping`: column key → `{ "property": "a.b", "type": "int" }`. Keys are
//!   header names when the input is named, stringified zero-based column
//!   indices otherwise.
//! - `calculated`: ordered list of `{ "property", "kind", "format", "type" }`
//!   fields computed per record.
//! - `extra_variables`: name → value (or `{ "value": "..." }`) used by
//!   calculated fields of kind `extra`.
//!
//! # Examples
//!
//! ```
//! use csv_mapper::mapping::{Configuration, FieldType};
//!
//! let configuration = Configuration::from_str(r#"{
//!     "mapping": { "id": { "property": "record.id", "type": "int" } },
//!     "calculated": [ { "property": "env", "kind": "extra", "format": "stage", "type": "string" } ],
//!     "extra_variables": { "stage": { "value": "prod" } }
//! }"#).unwrap();
//!
//! assert_eq!(configuration.mapping["id"].field_type, FieldType::Int);
//! assert_eq!(configuration.extra_variables["stage"].as_str(), "prod");
//! ```

use std::{collections::HashMap, fs::File, io::Read, path::Path};

use serde::Deserialize;

use crate::error::MappingError;

mod field_type;

pub use field_type::FieldType;

/// Mapping file used when none is given.
pub const DEFAULT_MAPPING_FILE: &str = "mapping.json";

/// Where a single column lands in the document and how it is typed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnConfiguration {
    /// Dotted document path, e.g. `customer.address.city`.
    pub property: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

/// A document value computed from something other than the row's cells.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalculatedField {
    pub property: String,
    /// One of `application`, `datetime`, `environment`, `extra`.
    ///
    /// Kept as written so that an unknown kind is reported when the field is
    /// resolved.
    pub kind: String,
    #[serde(default)]
    pub format: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

/// Static value available to `extra` calculated fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawExtraVariable")]
pub struct ExtraVariable(String);

impl ExtraVariable {
    pub fn new(value: impl Into<String>) -> Self {
        ExtraVariable(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExtraVariable {
    Wrapped { value: String },
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<RawExtraVariable> for ExtraVariable {
    fn from(raw: RawExtraVariable) -> Self {
        match raw {
            RawExtraVariable::Wrapped { value } | RawExtraVariable::Text(value) => {
                ExtraVariable(value)
            }
            RawExtraVariable::Number(number) => ExtraVariable(number.to_string()),
            RawExtraVariable::Bool(flag) => ExtraVariable(flag.to_string()),
        }
    }
}

/// Resolved configuration of a run. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub mapping: HashMap<String, ColumnConfiguration>,
    #[serde(default)]
    pub calculated: Vec<CalculatedField>,
    #[serde(default)]
    pub extra_variables: HashMap<String, ExtraVariable>,
}

impl Configuration {
    /// Loads a configuration from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MappingError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            MappingError::Config(format!(
                "failed to read mapping file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, MappingError> {
        serde_json::from_reader(rdr)
            .map_err(|e| MappingError::Config(format!("failed to parse mapping file: {}", e)))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, MappingError> {
        serde_json::from_str(content)
            .map_err(|e| MappingError::Config(format!("failed to parse mapping file: {}", e)))
    }

    /// Looks up the column configuration for a column key.
    pub fn column(&self, key: &str) -> Result<&ColumnConfiguration, MappingError> {
        self.mapping
            .get(key)
            .ok_or_else(|| MappingError::UnmappedColumn(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_full_configuration() -> Result<(), MappingError> {
        let configuration = Configuration::from_str(
            r#"{
                "mapping": {
                    "0": { "property": "id", "type": "int" },
                    "1": { "property": "name.first" }
                },
                "calculated": [
                    { "property": "meta.row", "kind": "application", "format": "record", "type": "int" },
                    { "property": "meta.home", "kind": "environment", "format": "HOME" }
                ],
                "extra_variables": {
                    "plain": "a",
                    "wrapped": { "value": "b" },
                    "number": 42,
                    "flag": true
                }
            }"#,
        )?;

        assert_eq!(configuration.mapping.len(), 2);
        assert_eq!(configuration.column("0")?.property, "id");
        assert_eq!(configuration.column("1")?.field_type, FieldType::String);
        assert_eq!(configuration.calculated.len(), 2);
        assert_eq!(configuration.calculated[0].kind, "application");
        assert_eq!(configuration.calculated[1].field_type, FieldType::String);
        assert_eq!(configuration.extra_variables["plain"].as_str(), "a");
        assert_eq!(configuration.extra_variables["wrapped"].as_str(), "b");
        assert_eq!(configuration.extra_variables["number"].as_str(), "42");
        assert_eq!(configuration.extra_variables["flag"].as_str(), "true");
        Ok(())
    }

    #[test]
    fn missing_sections_default_to_empty() -> Result<(), MappingError> {
        let configuration = Configuration::from_str("{}")?;
        assert_eq!(configuration, Configuration::default());
        Ok(())
    }

    #[test]
    fn unmapped_column_is_reported_by_key() {
        let configuration = Configuration::default();
        match configuration.column("text") {
            Err(MappingError::UnmappedColumn(key)) => assert_eq!(key, "text"),
            other => panic!("expected unmapped column, got {other:?}"),
        }
    }

    #[test]
    fn malformed_configuration_is_a_config_error() {
        assert!(matches!(
            Configuration::from_str("{ \"mapping\": [ }"),
            Err(MappingError::Config(_))
        ));
        assert!(matches!(
            Configuration::from_path("/definitely/not/here/mapping.json"),
            Err(MappingError::Config(_))
        ));
    }
}
