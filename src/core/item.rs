use crate::error::MappingError;

/// Result of a read: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<R> = Result<Option<R>, MappingError>;

pub type ItemProcessorResult<W> = Result<W, MappingError>;

pub type ItemWriterResult = Result<(), MappingError>;

/// Produces the input items of a step, one at a time.
pub trait ItemReader<R> {
    fn read(&self) -> ItemReaderResult<R>;
}

/// Turns one read item into one output item.
pub trait ItemProcessor<R, W> {
    fn process(&self, item: &R) -> ItemProcessorResult<W>;
}

/// Consumes the output items of a step.
///
/// `open` is called before the first item and `close` only after the last
/// item was written successfully, so writers that buffer can emit their
/// output there.
pub trait ItemWriter<W> {
    fn write(&self, item: W) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult;

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
