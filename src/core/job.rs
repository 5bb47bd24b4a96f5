use std::{
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
    time::{Duration, Instant},
};

use log::info;
use uuid::Uuid;

use crate::{
    error::MappingError,
    item::{
        csv::CsvRecordReaderBuilder,
        document::DocumentProcessor,
        output::{DEFAULT_TOML_PROPERTY_NAME, DocumentWriterBuilder, OutputFormat},
    },
    mapping::{Configuration, DEFAULT_MAPPING_FILE},
};

use super::{build_name, step::StepBuilder};

/// Path meaning stdin for the input and stdout for the output.
pub const STANDARD_STREAM: &str = "-";

/// Type alias for job execution results.
type JobResult<T> = Result<T, MappingError>;

/// Represents the execution of a job.
#[derive(Debug)]
pub struct JobExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// Number of data rows read from the input
    pub read_count: usize,
    /// Number of documents handed to the writer
    pub write_count: usize,
}

/// A configured CSV → document mapping run.
///
/// A job is built once with [`JobBuilder`] and can then be run against its
/// configured files ([`MappingJob::run`]) or against caller supplied streams
/// ([`MappingJob::transform`]).
///
/// # Examples
///
/// ```
/// use csv_mapper::core::job::JobBuilder;
/// use csv_mapper::mapping::Configuration;
///
/// let configuration = Configuration::from_str(r#"{
///     "mapping": {
///         "id": { "property": "property1", "type": "int" },
///         "text": { "property": "property2.property3", "type": "string" }
///     }
/// }"#).unwrap();
///
/// let job = JobBuilder::new().named(true).array(true).build().unwrap();
///
/// let mut output = Vec::new();
/// job.transform(&configuration, "id,text\n1,hello".as_bytes(), &mut output).unwrap();
///
/// assert_eq!(
///     String::from_utf8(output).unwrap(),
///     r#"[{"property1":1,"property2":{"property3":"hello"}}]"#
/// );
/// ```
#[derive(Debug)]
pub struct MappingJob {
    id: Uuid,
    name: String,
    input: String,
    output: String,
    mapping_file: PathBuf,
    configuration: Option<Configuration>,
    named: bool,
    array: bool,
    format: OutputFormat,
    toml_property_name: String,
    delimiter: u8,
}

impl MappingJob {
    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Loads the configuration (unless one was given to the builder), opens
    /// the input and output and runs the mapping.
    ///
    /// Nothing is read from the input when the configuration cannot be
    /// loaded. Both streams are closed when this returns, whatever the
    /// outcome.
    pub fn run(&self) -> JobResult<JobExecution> {
        let loaded;
        let configuration = match &self.configuration {
            Some(configuration) => configuration,
            None => {
                loaded = Configuration::from_path(&self.mapping_file)?;
                &loaded
            }
        };

        let input = open_input(&self.input)?;
        let output = open_output(&self.output)?;

        self.transform(configuration, input, output)
    }

    /// Maps every row of `input` and writes the encoded documents to `output`.
    ///
    /// The first error aborts the whole run. In streaming JSON mode the
    /// documents written before the failing row stay in `output`.
    pub fn transform<R: Read, W: Write>(
        &self,
        configuration: &Configuration,
        input: R,
        output: W,
    ) -> JobResult<JobExecution> {
        let start = Instant::now();

        info!("Start of job: {}, id: {}", self.name, self.id);

        let reader = CsvRecordReaderBuilder::new()
            .named(self.named)
            .delimiter(self.delimiter)
            .from_reader(input);

        let processor = DocumentProcessor::new(configuration);

        let writer = DocumentWriterBuilder::new()
            .format(self.format)
            .array(self.array)
            .toml_property_name(&self.toml_property_name)
            .from_writer(output);

        let step = StepBuilder::new()
            .name(self.name.clone())
            .reader(&reader)
            .processor(&processor)
            .writer(&writer)
            .build()?;

        let step_execution = step.execute()?;

        info!(
            "End of job: {}, id: {}, {} record(s) written",
            self.name, self.id, step_execution.write_count
        );

        Ok(JobExecution {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            read_count: step_execution.read_count,
            write_count: step_execution.write_count,
        })
    }
}

fn open_input(path: &str) -> JobResult<Box<dyn Read>> {
    if path == STANDARD_STREAM {
        return Ok(Box::new(io::stdin().lock()));
    }
    Ok(Box::new(File::open(path)?))
}

fn open_output(path: &str) -> JobResult<Box<dyn Write>> {
    if path == STANDARD_STREAM {
        return Ok(Box::new(io::stdout().lock()));
    }
    Ok(Box::new(File::create(path)?))
}

/// Builder for creating a [`MappingJob`].
///
/// # Default Configuration
///
/// - Input and output: `-` (stdin / stdout)
/// - Mapping file: `mapping.json`
/// - Named header: disabled
/// - Array mode: disabled (forced for YAML and TOML)
/// - Output format: JSON
/// - TOML property name: `data`
/// - Delimiter: comma (,)
#[derive(Debug)]
pub struct JobBuilder {
    name: Option<String>,
    input: String,
    output: String,
    mapping_file: PathBuf,
    configuration: Option<Configuration>,
    named: bool,
    array: bool,
    output_type: String,
    toml_property_name: String,
    delimiter: u8,
}

impl Default for JobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JobBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            input: STANDARD_STREAM.to_owned(),
            output: STANDARD_STREAM.to_owned(),
            mapping_file: PathBuf::from(DEFAULT_MAPPING_FILE),
            configuration: None,
            named: false,
            array: false,
            output_type: OutputFormat::Json.to_string(),
            toml_property_name: DEFAULT_TOML_PROPERTY_NAME.to_owned(),
            delimiter: b',',
        }
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Input file, `-` for stdin.
    pub fn input(mut self, path: &str) -> Self {
        self.input = path.to_owned();
        self
    }

    /// Output file, `-` for stdout. An existing file is truncated.
    pub fn output(mut self, path: &str) -> Self {
        self.output = path.to_owned();
        self
    }

    pub fn mapping_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.mapping_file = path.as_ref().to_path_buf();
        self
    }

    /// Uses an already resolved configuration instead of the mapping file.
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Whether the first input row is a header naming the columns.
    pub fn named(mut self, yes: bool) -> Self {
        self.named = yes;
        self
    }

    pub fn array(mut self, yes: bool) -> Self {
        self.array = yes;
        self
    }

    /// Output format name: `json`, `yaml` or `toml`. Empty means `json`.
    pub fn output_type(mut self, name: &str) -> Self {
        self.output_type = name.to_owned();
        self
    }

    pub fn toml_property_name(mut self, name: &str) -> Self {
        self.toml_property_name = name.to_owned();
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Validates the options and builds the job.
    ///
    /// # Errors
    ///
    /// [`MappingError::InvalidOption`] when the input or output path is blank
    /// or the output type is unknown.
    pub fn build(self) -> JobResult<MappingJob> {
        if self.input.trim().is_empty() {
            return Err(MappingError::InvalidOption("input may not be empty".to_owned()));
        }
        if self.output.trim().is_empty() {
            return Err(MappingError::InvalidOption("output may not be empty".to_owned()));
        }

        let format = OutputFormat::from_str(&self.output_type)?;

        let toml_property_name = if self.toml_property_name.is_empty() {
            DEFAULT_TOML_PROPERTY_NAME.to_owned()
        } else {
            self.toml_property_name
        };

        Ok(MappingJob {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            input: self.input,
            output: self.output,
            mapping_file: self.mapping_file,
            configuration: self.configuration,
            named: self.named,
            array: self.array || format.forces_array(),
            format,
            toml_property_name,
            delimiter: self.delimiter,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::MappingError;
    use crate::item::output::OutputFormat;

    use super::{JobBuilder, STANDARD_STREAM};

    #[test]
    fn defaults_read_stdin_and_write_json_to_stdout() -> Result<(), MappingError> {
        let job = JobBuilder::new().build()?;

        assert_eq!(job.input, STANDARD_STREAM);
        assert_eq!(job.output, STANDARD_STREAM);
        assert_eq!(job.format, OutputFormat::Json);
        assert!(!job.array);
        assert!(!job.named);
        assert_eq!(job.toml_property_name, "data");
        assert_eq!(job.mapping_file.to_str(), Some("mapping.json"));
        assert_eq!(job.get_name().len(), 8);
        Ok(())
    }

    #[test]
    fn array_and_named_are_kept() -> Result<(), MappingError> {
        let job = JobBuilder::new()
            .name("test".to_string())
            .input("input.csv")
            .output("output.json")
            .array(true)
            .named(true)
            .build()?;

        assert_eq!(job.get_name(), "test");
        assert_eq!(job.input, "input.csv");
        assert_eq!(job.output, "output.json");
        assert!(job.array);
        assert!(job.named);
        Ok(())
    }

    #[test]
    fn yaml_and_toml_imply_array() -> Result<(), MappingError> {
        assert!(JobBuilder::new().output_type("yaml").build()?.array);

        let job = JobBuilder::new()
            .output_type("toml")
            .toml_property_name("")
            .build()?;
        assert!(job.array);
        assert_eq!(job.toml_property_name, "data");
        Ok(())
    }

    #[test]
    fn invalid_options_are_rejected() {
        for builder in [
            JobBuilder::new().input(""),
            JobBuilder::new().output("  "),
            JobBuilder::new().output_type("xml"),
        ] {
            assert!(matches!(
                builder.build(),
                Err(MappingError::InvalidOption(_))
            ));
        }
    }
}
