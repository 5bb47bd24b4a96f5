use std::{
    cell::{Cell, RefCell},
    io::{BufWriter, Write},
};

use log::debug;

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    document::Document,
};

use super::{DEFAULT_TOML_PROPERTY_NAME, OutputFormat};

/// Writes mapped documents in the configured output format.
///
/// In array mode documents are kept until [`ItemWriter::close`] and encoded
/// there as one array. Otherwise (JSON only) each document is encoded and
/// written as soon as it arrives, separated from the previous one by a
/// newline, with no trailing newline.
///
/// # Examples
///
/// ```
/// use csv_mapper::core::item::ItemWriter;
/// use csv_mapper::document::{Document, Value};
/// use csv_mapper::item::output::{DocumentWriterBuilder, OutputFormat};
///
/// let mut buffer = Vec::new();
/// {
///     let writer = DocumentWriterBuilder::new()
///         .format(OutputFormat::Json)
///         .array(true)
///         .from_writer(&mut buffer);
///
///     let mut document = Document::new();
///     document.set("a.b", Value::Int(1));
///
///     writer.open().unwrap();
///     writer.write(document.clone()).unwrap();
///     writer.write(document).unwrap();
///     writer.close().unwrap();
/// }
///
/// assert_eq!(String::from_utf8(buffer).unwrap(), r#"[{"a":{"b":1}},{"a":{"b":1}}]"#);
/// ```
pub struct DocumentWriter<W: Write> {
    stream: RefCell<BufWriter<W>>,
    format: OutputFormat,
    array: bool,
    toml_property_name: String,
    documents: RefCell<Vec<Document>>,
    written: Cell<usize>,
}

impl<W: Write> DocumentWriter<W> {
    /// Whether documents are collected and emitted as one array.
    pub fn is_array(&self) -> bool {
        self.array
    }

    fn write_bytes(&self, bytes: &[u8]) -> ItemWriterResult {
        self.stream.borrow_mut().write_all(bytes)?;
        Ok(())
    }
}

impl<W: Write> ItemWriter<Document> for DocumentWriter<W> {
    fn write(&self, document: Document) -> ItemWriterResult {
        if self.array {
            self.documents.borrow_mut().push(document);
            return Ok(());
        }

        let encoded = self.format.encode_document(&document)?;
        if self.written.get() > 0 {
            self.write_bytes(b"\n")?;
        }
        self.write_bytes(&encoded)?;
        self.written.set(self.written.get() + 1);
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.stream.borrow_mut().flush()?;
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        if self.array {
            let documents = self.documents.take();
            debug!(
                "Encoding {} document(s) as a {} array",
                documents.len(),
                self.format
            );
            let encoded = self
                .format
                .encode_documents(&documents, &self.toml_property_name)?;
            self.write_bytes(&encoded)?;
            self.written.set(documents.len());
        }
        self.flush()
    }
}

/// A builder for [`DocumentWriter`].
///
/// # Default Configuration
///
/// - Format: JSON
/// - Array mode: disabled (forced on for YAML and TOML)
/// - TOML property name: `data`
pub struct DocumentWriterBuilder {
    format: OutputFormat,
    array: bool,
    toml_property_name: String,
}

impl Default for DocumentWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentWriterBuilder {
    pub fn new() -> Self {
        Self {
            format: OutputFormat::Json,
            array: false,
            toml_property_name: DEFAULT_TOML_PROPERTY_NAME.to_owned(),
        }
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Requests array mode. Ignored for formats that are always arrays.
    pub fn array(mut self, yes: bool) -> Self {
        self.array = yes;
        self
    }

    /// Sets the key the TOML array is stored under. Empty means `data`.
    pub fn toml_property_name(mut self, name: &str) -> Self {
        self.toml_property_name = if name.is_empty() {
            DEFAULT_TOML_PROPERTY_NAME.to_owned()
        } else {
            name.to_owned()
        };
        self
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> DocumentWriter<W> {
        DocumentWriter {
            stream: RefCell::new(BufWriter::new(wtr)),
            format: self.format,
            array: self.array || self.format.forces_array(),
            toml_property_name: self.toml_property_name,
            documents: RefCell::new(Vec::new()),
            written: Cell::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        core::item::ItemWriter,
        document::{Document, Value},
        error::MappingError,
    };

    use super::{DocumentWriterBuilder, OutputFormat};

    fn document(id: i64, text: &str) -> Document {
        let mut document = Document::new();
        document.set("id", Value::Int(id));
        document.set("text", Value::String(text.to_owned()));
        document
    }

    fn write_all(
        builder: DocumentWriterBuilder,
        documents: Vec<Document>,
    ) -> Result<String, MappingError> {
        let mut buffer = Vec::new();
        {
            let writer = builder.from_writer(&mut buffer);
            writer.open()?;
            for document in documents {
                writer.write(document)?;
            }
            writer.close()?;
        }
        Ok(String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn json_lines_have_no_trailing_newline() -> Result<(), MappingError> {
        let output = write_all(
            DocumentWriterBuilder::new(),
            vec![document(1, "a"), document(2, "b")],
        )?;

        assert_eq!(output, "{\"id\":1,\"text\":\"a\"}\n{\"id\":2,\"text\":\"b\"}");
        Ok(())
    }

    #[test]
    fn json_array_with_no_documents_is_empty_array() -> Result<(), MappingError> {
        let output = write_all(DocumentWriterBuilder::new().array(true), vec![])?;
        assert_eq!(output, "[]");

        let output = write_all(DocumentWriterBuilder::new(), vec![])?;
        assert_eq!(output, "");
        Ok(())
    }

    #[test]
    fn yaml_and_toml_force_array_mode() {
        let mut buffer = Vec::new();
        let writer = DocumentWriterBuilder::new()
            .format(OutputFormat::Yaml)
            .array(false)
            .from_writer(&mut buffer);
        assert!(writer.is_array());

        let mut buffer = Vec::new();
        let writer = DocumentWriterBuilder::new()
            .format(OutputFormat::Toml)
            .from_writer(&mut buffer);
        assert!(writer.is_array());

        let mut buffer = Vec::new();
        let writer = DocumentWriterBuilder::new().from_writer(&mut buffer);
        assert!(!writer.is_array());
    }

    #[test]
    fn toml_uses_default_property_name() -> Result<(), MappingError> {
        let output = write_all(
            DocumentWriterBuilder::new()
                .format(OutputFormat::Toml)
                .toml_property_name(""),
            vec![document(1, "a")],
        )?;

        let parsed: toml::Table = toml::from_str(&output).unwrap();
        let data = parsed["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["text"].as_str(), Some("a"));
        Ok(())
    }

    #[test]
    fn nothing_is_emitted_in_array_mode_before_close() -> Result<(), MappingError> {
        let mut buffer = Vec::new();
        {
            let writer = DocumentWriterBuilder::new()
                .format(OutputFormat::Yaml)
                .from_writer(&mut buffer);
            writer.open()?;
            writer.write(document(1, "a"))?;
            writer.flush()?;
        }
        assert!(buffer.is_empty());
        Ok(())
    }
}
