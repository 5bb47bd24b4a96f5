use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use log::{debug, error};

use crate::error::MappingError;

use super::{
    build_name,
    item::{ItemProcessor, ItemReader, ItemWriter},
};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum StepStatus {
    Started,
    Success,
    Error,
}

/// Outcome of a successful step.
#[derive(Debug)]
pub struct StepExecution {
    pub name: String,
    pub start: Instant,
    pub end: Instant,
    pub duration: Duration,
    pub status: StepStatus,
    pub read_count: usize,
    pub process_count: usize,
    pub write_count: usize,
}

/// Sequential read → process → write loop.
///
/// Items flow strictly in read order, one at a time. The first error from
/// any of the three collaborators stops the step and is returned as is; the
/// writer is closed only when every item went through.
pub struct Step<'a, R, W> {
    name: String,
    reader: &'a dyn ItemReader<R>,
    processor: &'a dyn ItemProcessor<R, W>,
    writer: &'a dyn ItemWriter<W>,
    status: Cell<StepStatus>,
    read_count: Cell<usize>,
    process_count: Cell<usize>,
    write_count: Cell<usize>,
}

impl<R, W> Step<'_, R, W> {
    pub fn execute(&self) -> Result<StepExecution, MappingError> {
        let start = Instant::now();

        debug!("Start of step: {}", self.name);
        self.status.set(StepStatus::Started);

        if let Err(err) = self.run() {
            self.status.set(StepStatus::Error);
            error!("Step {} failed: {}", self.name, err);
            // Keep whatever was already emitted.
            if let Err(flush_err) = self.writer.flush() {
                error!("Unable to flush writer of step {}: {}", self.name, flush_err);
            }
            return Err(err);
        }

        self.status.set(StepStatus::Success);
        debug!("End of step: {}", self.name);

        Ok(StepExecution {
            name: self.name.clone(),
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            status: self.status.get(),
            read_count: self.read_count.get(),
            process_count: self.process_count.get(),
            write_count: self.write_count.get(),
        })
    }

    fn run(&self) -> Result<(), MappingError> {
        self.writer.open()?;

        while let Some(item) = self.reader.read()? {
            self.inc(&self.read_count);

            let processed = self.processor.process(&item)?;
            self.inc(&self.process_count);

            self.writer.write(processed)?;
            self.inc(&self.write_count);
        }

        debug!(
            "Step {}: {} item(s) read, closing writer",
            self.name,
            self.read_count.get()
        );
        self.writer.close()
    }

    fn inc(&self, counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_status(&self) -> StepStatus {
        self.status.get()
    }

    pub fn get_read_count(&self) -> usize {
        self.read_count.get()
    }

    pub fn get_write_count(&self) -> usize {
        self.write_count.get()
    }
}

pub struct StepBuilder<'a, R, W> {
    name: Option<String>,
    reader: Option<&'a dyn ItemReader<R>>,
    processor: Option<&'a dyn ItemProcessor<R, W>>,
    writer: Option<&'a dyn ItemWriter<W>>,
}

impl<R, W> Default for StepBuilder<'_, R, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, R, W> StepBuilder<'a, R, W> {
    pub fn new() -> Self {
        Self {
            name: None,
            reader: None,
            processor: None,
            writer: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn reader(mut self, reader: &'a impl ItemReader<R>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a impl ItemProcessor<R, W>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a impl ItemWriter<W>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Builds the step.
    ///
    /// # Errors
    ///
    /// [`MappingError::InvalidOption`] if the reader, processor or writer was
    /// not set.
    pub fn build(self) -> Result<Step<'a, R, W>, MappingError> {
        Ok(Step {
            name: self.name.unwrap_or_else(build_name),
            reader: self.reader.ok_or_else(|| missing("reader"))?,
            processor: self.processor.ok_or_else(|| missing("processor"))?,
            writer: self.writer.ok_or_else(|| missing("writer"))?,
            status: Cell::new(StepStatus::Started),
            read_count: Cell::new(0),
            process_count: Cell::new(0),
            write_count: Cell::new(0),
        })
    }
}

fn missing(part: &str) -> MappingError {
    MappingError::InvalidOption(format!("a step needs a {}", part))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::core::item::{
        ItemProcessor, ItemProcessorResult, ItemReader, ItemReaderResult, ItemWriter,
        ItemWriterResult,
    };
    use crate::error::MappingError;

    use super::{StepBuilder, StepStatus};

    struct NumberReader {
        items: RefCell<Vec<i32>>,
    }

    impl NumberReader {
        fn new(mut items: Vec<i32>) -> Self {
            items.reverse();
            Self {
                items: RefCell::new(items),
            }
        }
    }

    impl ItemReader<i32> for NumberReader {
        fn read(&self) -> ItemReaderResult<i32> {
            Ok(self.items.borrow_mut().pop())
        }
    }

    struct Doubler;

    impl ItemProcessor<i32, i32> for Doubler {
        fn process(&self, item: &i32) -> ItemProcessorResult<i32> {
            if *item < 0 {
                return Err(MappingError::UnmappedColumn(item.to_string()));
            }
            Ok(item * 2)
        }
    }

    #[derive(Default)]
    struct VecWriter {
        items: RefCell<Vec<i32>>,
        closed: RefCell<bool>,
    }

    impl ItemWriter<i32> for VecWriter {
        fn write(&self, item: i32) -> ItemWriterResult {
            self.items.borrow_mut().push(item);
            Ok(())
        }

        fn flush(&self) -> ItemWriterResult {
            Ok(())
        }

        fn close(&self) -> ItemWriterResult {
            *self.closed.borrow_mut() = true;
            Ok(())
        }
    }

    #[test]
    fn items_flow_in_order_and_writer_is_closed() -> Result<(), MappingError> {
        let reader = NumberReader::new(vec![1, 2, 3]);
        let writer = VecWriter::default();

        let step = StepBuilder::new()
            .name("double")
            .reader(&reader)
            .processor(&Doubler)
            .writer(&writer)
            .build()?;

        let execution = step.execute()?;

        assert_eq!(execution.name, "double");
        assert_eq!(execution.status, StepStatus::Success);
        assert_eq!(execution.read_count, 3);
        assert_eq!(execution.process_count, 3);
        assert_eq!(execution.write_count, 3);
        assert_eq!(*writer.items.borrow(), vec![2, 4, 6]);
        assert!(*writer.closed.borrow());
        Ok(())
    }

    #[test]
    fn first_error_aborts_without_closing() -> Result<(), MappingError> {
        let reader = NumberReader::new(vec![1, -1, 3]);
        let writer = VecWriter::default();

        let step = StepBuilder::new()
            .reader(&reader)
            .processor(&Doubler)
            .writer(&writer)
            .build()?;

        let result = step.execute();

        assert!(matches!(result, Err(MappingError::UnmappedColumn(_))));
        assert_eq!(step.get_status(), StepStatus::Error);
        assert_eq!(step.get_read_count(), 2);
        assert_eq!(step.get_write_count(), 1);
        assert_eq!(*writer.items.borrow(), vec![2]);
        assert!(!*writer.closed.borrow());
        Ok(())
    }

    #[test]
    fn incomplete_step_is_rejected() {
        let reader = NumberReader::new(vec![1]);
        let writer = VecWriter::default();

        let without_writer = StepBuilder::new().reader(&reader).processor(&Doubler).build();
        match without_writer {
            Err(MappingError::InvalidOption(message)) => assert!(message.contains("writer")),
            Err(other) => panic!("expected invalid option, got {other:?}"),
            Ok(_) => panic!("a step without writer was built"),
        }

        let without_reader = StepBuilder::<i32, i32>::new()
            .processor(&Doubler)
            .writer(&writer)
            .build();
        assert!(matches!(without_reader, Err(MappingError::InvalidOption(_))));
    }
}
