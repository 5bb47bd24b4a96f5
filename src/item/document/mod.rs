/// Calculated field resolution (row index, clock, environment, extra variables).
pub mod calculated;

/// Row → document assembly driven by the mapping configuration.
pub mod document_processor;

pub use calculated::{CalculatedFieldResolver, CalculatedKind};
pub use document_processor::DocumentProcessor;
