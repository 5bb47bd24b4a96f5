/// CSV input for mapping runs.
///
/// [`csv_reader::CsvRecordReader`] streams rows out of any `Read` source and
/// keys every cell by its column: the header name when the input is named,
/// the zero-based column index otherwise. Those keys are what the mapping
/// table of a [`Configuration`](crate::mapping::Configuration) is indexed by.
///
/// # Examples
///
/// ```
/// use csv_mapper::item::csv::csv_reader::CsvRecordReaderBuilder;
/// use csv_mapper::core::item::ItemReader;
///
/// let reader = CsvRecordReaderBuilder::new()
///     .delimiter(b';')
///     .from_reader("1;hello\n2;world".as_bytes());
///
/// let mut texts = Vec::new();
/// while let Some(row) = reader.read().unwrap() {
///     texts.push(row.get("1").unwrap().to_string());
/// }
///
/// assert_eq!(texts, vec!["hello", "world"]);
/// ```
pub mod csv_reader;

pub use csv_reader::{CsvRecordReader, CsvRecordReaderBuilder, CsvRow};
