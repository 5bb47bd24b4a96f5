use thiserror::Error;

use crate::mapping::FieldType;

#[derive(Error, Debug)]
/// Mapping error
///
/// Every variant is fatal: a run stops at the first error and hands it back
/// to the caller.
pub enum MappingError {
    /// The mapping configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The delimited input is structurally invalid.
    #[error("Malformed row: {0}")]
    RowFormat(String),

    /// A column of the current row has no entry in the mapping table.
    #[error("Mapping configuration missing for column key {0}")]
    UnmappedColumn(String),

    #[error("Cannot convert {value:?} to {field_type}: {reason}")]
    Coercion {
        field_type: FieldType,
        value: String,
        reason: String,
    },

    #[error("Unknown calculated field kind {0:?}")]
    UnknownCalculatedKind(String),

    #[error("Unknown format {format:?} for calculated field kind {kind}")]
    UnknownCalculatedFormat { kind: String, format: String },

    #[error("Extra variable {0} not found")]
    MissingExtraVariable(String),

    /// The output encoder rejected the documents.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A run-level option has an unusable value.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
