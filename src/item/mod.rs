/// This module provides the CSV record reader.
pub mod csv;

/// This module turns CSV rows into documents according to a mapping configuration.
pub mod document;

/// This module provides the JSON, YAML and TOML document writer.
pub mod output;
