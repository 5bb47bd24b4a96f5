use crate::{
    core::item::{ItemProcessor, ItemProcessorResult},
    document::Document,
    item::csv::CsvRow,
    mapping::Configuration,
};

use super::calculated::CalculatedFieldResolver;

/// Builds one [`Document`] per CSV row.
///
/// Every cell is coerced to its column's declared type and written at the
/// column's property path. Calculated fields follow, in configuration order,
/// so they may overwrite paths already set by columns.
///
/// # Examples
///
/// ```
/// use csv_mapper::core::item::ItemProcessor;
/// use csv_mapper::item::csv::CsvRow;
/// use csv_mapper::item::document::DocumentProcessor;
/// use csv_mapper::mapping::Configuration;
///
/// let configuration = Configuration::from_str(r#"{
///     "mapping": { "0": { "property": "user.id", "type": "int" } },
///     "calculated": [ { "property": "user.row", "kind": "application", "format": "record", "type": "int" } ]
/// }"#).unwrap();
///
/// let processor = DocumentProcessor::new(&configuration);
/// let row = CsvRow { index: 3, cells: vec![("0".to_string(), "42".to_string())] };
///
/// let document = processor.process(&row).unwrap();
/// assert_eq!(serde_json::to_string(&document).unwrap(), r#"{"user":{"id":42,"row":3}}"#);
/// ```
pub struct DocumentProcessor<'a> {
    configuration: &'a Configuration,
    resolver: CalculatedFieldResolver<'a>,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(configuration: &'a Configuration) -> Self {
        Self {
            configuration,
            resolver: CalculatedFieldResolver::new(&configuration.extra_variables),
        }
    }
}

impl ItemProcessor<CsvRow, Document> for DocumentProcessor<'_> {
    fn process(&self, row: &CsvRow) -> ItemProcessorResult<Document> {
        let mut document = Document::new();

        for (key, raw) in &row.cells {
            let column = self.configuration.column(key)?;
            document.set(&column.property, column.field_type.coerce(raw)?);
        }

        for field in &self.configuration.calculated {
            let value = self.resolver.resolve(field, row.index)?;
            document.set(&field.property, value);
        }

        Ok(document)
    }
}
