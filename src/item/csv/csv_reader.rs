use csv::{Reader, ReaderBuilder, StringRecord, Terminator, Trim};
use std::{
    cell::Cell,
    cell::RefCell,
    io::{self, Read},
};

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::MappingError,
};

const QUOTE: u8 = b'"';

/// One data row of the input.
///
/// Cells are copied out of the reader's buffer and paired with their column
/// key: the header name when the input is named, the stringified zero-based
/// column index otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    /// Zero-based position of the row among the data rows.
    pub index: usize,
    pub cells: Vec<(String, String)>,
}

impl CsvRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(column, _)| column == key)
            .map(|(_, value)| value.as_str())
    }
}

/// A CSV reader that implements the `ItemReader` trait.
///
/// Rows are read one by one into a single reused [`StringRecord`]; nothing
/// past the current row is held in memory.
///
/// # Examples
///
/// ```
/// use csv_mapper::item::csv::csv_reader::CsvRecordReaderBuilder;
/// use csv_mapper::core::item::ItemReader;
///
/// let data = "\
/// city,pop
/// Boston,4628910
/// Concord,42695
/// ";
///
/// let reader = CsvRecordReaderBuilder::new()
///     .named(true)
///     .from_reader(data.as_bytes());
///
/// let row = reader.read().unwrap().unwrap();
/// assert_eq!(row.index, 0);
/// assert_eq!(row.get("city"), Some("Boston"));
///
/// let row = reader.read().unwrap().unwrap();
/// assert_eq!(row.index, 1);
/// assert_eq!(row.get("pop"), Some("42695"));
///
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct CsvRecordReader<R> {
    rdr: RefCell<Reader<QuoteTracker<R>>>,
    /// Reused between reads.
    record: RefCell<StringRecord>,
    named: bool,
    /// Column keys, resolved on the first read.
    keys: RefCell<Option<Vec<String>>>,
    position: Cell<usize>,
}

/// Keeps the bytes of the record being parsed so its quotes can be counted
/// once the `csv` reader reports where the record ended.
///
/// The `csv` reader takes an unterminated quoted field to the end of the
/// input, so the only visible trace of one is an odd number of quotes in the
/// bytes the record spans.
struct QuoteTracker<R> {
    inner: R,
    /// Bytes read but not yet accounted to a record.
    pending: Vec<u8>,
    /// Stream offset of `pending[0]`.
    offset: u64,
}

impl<R> QuoteTracker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            offset: 0,
        }
    }

    /// Whether the bytes in `start..end` hold a balanced number of quotes.
    /// Bytes before `end` are released.
    fn balanced(&mut self, start: u64, end: u64) -> bool {
        let from = start.saturating_sub(self.offset) as usize;
        let to = (end.saturating_sub(self.offset) as usize).min(self.pending.len());

        let quotes = self.pending[from.min(to)..to]
            .iter()
            .filter(|&&byte| byte == QUOTE)
            .count();

        self.pending.drain(..to);
        self.offset += to as u64;

        quotes % 2 == 0
    }
}

impl<R: Read> Read for QuoteTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pending.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

impl<R: Read> CsvRecordReader<R> {
    fn column_key(&self, column: usize) -> Result<String, MappingError> {
        if !self.named {
            return Ok(column.to_string());
        }

        let mut keys = self.keys.borrow_mut();
        if keys.is_none() {
            let headers = self
                .rdr
                .borrow_mut()
                .headers()
                .map_err(|e| MappingError::RowFormat(e.to_string()))?
                .iter()
                .map(str::to_owned)
                .collect();
            *keys = Some(headers);
        }

        keys.as_ref()
            .and_then(|keys| keys.get(column).cloned())
            .ok_or_else(|| {
                MappingError::RowFormat(format!("no header for column {}", column))
            })
    }
}

impl<R: Read> ItemReader<CsvRow> for CsvRecordReader<R> {
    /// Reads the next data row.
    ///
    /// # Returns
    /// - `Ok(Some(row))` if a row was read
    /// - `Ok(None)` at end of input
    /// - `Err(MappingError::RowFormat(_))` on malformed input
    fn read(&self) -> ItemReaderResult<CsvRow> {
        let has_record = {
            let mut rdr = self.rdr.borrow_mut();
            let mut record = self.record.borrow_mut();

            let start = rdr.position().clone();
            let has_record = rdr
                .read_record(&mut record)
                .map_err(|e| MappingError::RowFormat(e.to_string()))?;
            let end = rdr.position().byte();

            if !rdr.get_mut().balanced(start.byte(), end) {
                return Err(MappingError::RowFormat(format!(
                    "unterminated quoted field in record starting on line {}",
                    start.line()
                )));
            }
            has_record
        };

        if !has_record {
            return Ok(None);
        }

        let record = self.record.borrow();
        let mut cells = Vec::with_capacity(record.len());
        for (column, value) in record.iter().enumerate() {
            cells.push((self.column_key(column)?, value.to_owned()));
        }

        let index = self.position.get();
        self.position.set(index + 1);

        Ok(Some(CsvRow { index, cells }))
    }
}

/// A builder for configuring CSV record reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Terminator: CRLF (accepts `\n`, `\r` and `\r\n`)
/// - Named: disabled (columns are keyed by position)
/// - Trimming: none
pub struct CsvRecordReaderBuilder {
    delimiter: u8,
    terminator: Terminator,
    named: bool,
    trim: Trim,
}

impl Default for CsvRecordReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvRecordReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            terminator: Terminator::CRLF,
            named: false,
            trim: Trim::None,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Sets whether the first row is a header.
    ///
    /// When enabled the header row is consumed, excluded from the data rows,
    /// and its names become the column keys.
    pub fn named(mut self, yes: bool) -> Self {
        self.named = yes;
        self
    }

    pub fn trim(mut self, trim: Trim) -> Self {
        self.trim = trim;
        self
    }

    /// Creates a `CsvRecordReader` from any `Read` source.
    ///
    /// Parsing is strict: a row with a different field count than the
    /// previous ones, or a quoted field left open at the end of the input,
    /// is reported as malformed.
    pub fn from_reader<R: Read>(self, rdr: R) -> CsvRecordReader<R> {
        let rdr = ReaderBuilder::new()
            .trim(self.trim)
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .has_headers(self.named)
            .quote(QUOTE)
            .flexible(false)
            .from_reader(QuoteTracker::new(rdr));

        CsvRecordReader {
            rdr: RefCell::new(rdr),
            record: RefCell::new(StringRecord::new()),
            named: self.named,
            keys: RefCell::new(None),
            position: Cell::new(0),
        }
    }
}
