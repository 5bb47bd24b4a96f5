//! Output encodings for mapped documents.
//!
//! The format is chosen once, when the run is configured, and then used as a
//! fixed strategy by [`DocumentWriter`]:
//!
//! | Format | Array mode      | Array output                         |
//! |--------|-----------------|--------------------------------------|
//! | json   | caller's choice | `[{...},{...}]` or one object a line |
//! | yaml   | always          | a sequence of mappings               |
//! | toml   | always          | `[[data]]` tables under a wrapper key |

use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{document::Document, error::MappingError};

/// Writer of encoded documents.
pub mod document_writer;

pub use document_writer::{DocumentWriter, DocumentWriterBuilder};

/// Key the TOML array is stored under when none is configured.
pub const DEFAULT_TOML_PROPERTY_NAME: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

impl FromStr for OutputFormat {
    type Err = MappingError;

    /// Parses a format name; an empty name means JSON.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "" | "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "toml" => Ok(OutputFormat::Toml),
            _ => Err(MappingError::InvalidOption(format!(
                "unknown output type {:?}",
                name
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Toml => "toml",
        })
    }
}

impl OutputFormat {
    /// YAML and TOML always serialize the whole collected sequence.
    pub fn forces_array(self) -> bool {
        !matches!(self, OutputFormat::Json)
    }

    /// Encodes a single document, for line-by-line output.
    ///
    /// Only JSON streams documents one at a time; the other formats are
    /// always encoded as a whole with [`OutputFormat::encode_documents`].
    pub fn encode_document(self, document: &Document) -> Result<Vec<u8>, MappingError> {
        match self {
            OutputFormat::Json => serde_json::to_vec(document).map_err(serialization),
            OutputFormat::Yaml | OutputFormat::Toml => Err(MappingError::Serialization(format!(
                "{} output is always an array",
                self
            ))),
        }
    }

    /// Encodes all documents as one array value.
    ///
    /// TOML has no top-level array, so the array is stored in a table under
    /// `toml_property_name` instead.
    pub fn encode_documents(
        self,
        documents: &[Document],
        toml_property_name: &str,
    ) -> Result<Vec<u8>, MappingError> {
        match self {
            OutputFormat::Json => serde_json::to_vec(documents).map_err(serialization),
            OutputFormat::Yaml => serde_yaml::to_string(documents)
                .map(String::into_bytes)
                .map_err(serialization),
            OutputFormat::Toml => {
                let wrapper = BTreeMap::from([(toml_property_name, documents)]);
                toml::to_string(&wrapper)
                    .map(String::into_bytes)
                    .map_err(serialization)
            }
        }
    }
}

fn serialization(error: impl fmt::Display) -> MappingError {
    MappingError::Serialization(error.to_string())
}
