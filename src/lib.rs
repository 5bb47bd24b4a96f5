#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # CSV Mapper

 A declarative CSV → JSON / YAML / TOML transformation engine. Each row of a
 delimited input is turned into a nested document: every column is coerced to
 its declared type and written at a dotted property path, then "calculated
 fields" (row number, current time, environment variables, static extra
 variables) are added on top. The documents are serialized either one per
 line (JSON) or collected into a single array.

 ## Core Concepts

- **Configuration:** The mapping table (column key → property path and type),
  the ordered list of calculated fields and the extra variables. Loaded once per
  run from a JSON document.
- **ItemReader:** Produces the input of a step one item at a time. Here:
  `CsvRecordReader`, yielding keyed rows.
- **ItemProcessor:** Turns one item into another. Here: `DocumentProcessor`,
  building a `Document` out of a row.
- **ItemWriter:** Consumes the output of a step. Here: `DocumentWriter`,
  encoding documents as JSON, YAML or TOML.
- **Step:** The sequential read → process → write loop.
- **Job:** A `MappingJob` wires everything together for one run.

 ## Output formats

| **Format** | **Array mode**     | **Output**                                         |
|------------|--------------------|----------------------------------------------------|
| json       | optional           | `[{...},{...}]`, or one object per line            |
| yaml       | always             | a sequence of mappings                             |
| toml       | always             | an array of tables under a property (default `data`) |

 ## Getting Started

```rust
# use csv_mapper::{core::job::JobBuilder, mapping::Configuration, MappingError};
fn main() -> Result<(), MappingError> {
    let configuration = Configuration::from_str(r#"{
        "mapping": {
            "id": { "property": "property1", "type": "int" },
            "text": { "property": "property2.property3", "type": "string" },
            "value": { "property": "property4", "type": "float" },
            "b": { "property": "property2.property5", "type": "bool" }
        },
        "calculated": [
            { "property": "meta.row", "kind": "application", "format": "record", "type": "int" }
        ]
    }"#)?;

    let csv = "id,text,value,b
1,hello,2.3,true
2,world,3.4,false";

    let job = JobBuilder::new().named(true).build()?;

    let mut output = Vec::new();
    let execution = job.transform(&configuration, csv.as_bytes(), &mut output)?;

    assert_eq!(execution.write_count, 2);
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "{\"meta\":{\"row\":0},\"property1\":1,\"property2\":{\"property3\":\"hello\",\"property5\":true},\"property4\":2.3}\n\
         {\"meta\":{\"row\":1},\"property1\":2,\"property2\":{\"property3\":\"world\",\"property5\":false},\"property4\":3.4}"
    );

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for mapping runs: item traits, step and job
pub mod core;

/// Nested documents and path assembly
pub mod document;

/// Error types for mapping runs
pub mod error;

#[doc(inline)]
pub use error::*;

/// Readers, processors and writers of a mapping run
pub mod item;

/// Mapping configuration and type coercion
pub mod mapping;
