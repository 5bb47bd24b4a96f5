use std::{collections::HashMap, env, fmt::Write, str::FromStr};

use chrono::Local;

use crate::{
    document::Value,
    error::MappingError,
    mapping::{CalculatedField, ExtraVariable},
};

/// Source of a calculated field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculatedKind {
    /// Values known to the run itself. Only the `record` format exists.
    Application,
    /// Current local time, formatted with a strftime pattern.
    Datetime,
    /// A process environment variable.
    Environment,
    /// An entry of the configuration's extra variables.
    Extra,
}

impl FromStr for CalculatedKind {
    type Err = MappingError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "application" => Ok(CalculatedKind::Application),
            "datetime" => Ok(CalculatedKind::Datetime),
            "environment" => Ok(CalculatedKind::Environment),
            "extra" => Ok(CalculatedKind::Extra),
            _ => Err(MappingError::UnknownCalculatedKind(kind.to_owned())),
        }
    }
}

const RECORD_FORMAT: &str = "record";

/// Computes calculated fields for a record.
pub struct CalculatedFieldResolver<'a> {
    extra_variables: &'a HashMap<String, ExtraVariable>,
}

impl<'a> CalculatedFieldResolver<'a> {
    pub fn new(extra_variables: &'a HashMap<String, ExtraVariable>) -> Self {
        Self { extra_variables }
    }

    /// Resolves `field` for the record at `record_index` (zero-based).
    pub fn resolve(
        &self,
        field: &CalculatedField,
        record_index: usize,
    ) -> Result<Value, MappingError> {
        match field.kind.parse::<CalculatedKind>()? {
            CalculatedKind::Application => match field.format.as_str() {
                RECORD_FORMAT => field.field_type.coerce(&record_index.to_string()),
                _ => Err(MappingError::UnknownCalculatedFormat {
                    kind: field.kind.clone(),
                    format: field.format.clone(),
                }),
            },
            CalculatedKind::Datetime => {
                let mut formatted = String::new();
                // chrono reports an invalid pattern as a formatting error
                write!(formatted, "{}", Local::now().format(&field.format)).map_err(|_| {
                    MappingError::UnknownCalculatedFormat {
                        kind: field.kind.clone(),
                        format: field.format.clone(),
                    }
                })?;
                Ok(Value::String(formatted))
            }
            CalculatedKind::Environment => {
                let raw = env::var(&field.format).unwrap_or_default();
                field.field_type.coerce(&raw)
            }
            CalculatedKind::Extra => {
                let variable = self
                    .extra_variables
                    .get(&field.format)
                    .ok_or_else(|| MappingError::MissingExtraVariable(field.format.clone()))?;
                field.field_type.coerce(variable.as_str())
            }
        }
    }
}
