// Processing module: pure transformations over datasets

mod aggregate;
mod derive;
mod filter;
pub mod stats;

pub use aggregate::*;
pub use derive::*;
pub use filter::*;

use thiserror::Error;

use crate::data::{DataError, DataSet};

/// A processor that transforms a dataset into a new dataset.
pub trait DataProcessor {
    /// Process a dataset and return a new dataset.
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError>;

    /// Get the processor name.
    fn name(&self) -> &str;

    /// Get the processor type.
    fn processor_type(&self) -> ProcessorType;
}

/// Processor category.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorType {
    Transform,
    Filter,
    Aggregate,
    Report,
    Custom(String),
}

/// Errors raised while processing datasets.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Pipeline for chaining multiple processors.
pub struct Pipeline {
    name: String,
    processors: Vec<Box<dyn DataProcessor>>,
}

impl Pipeline {
    /// Create a new pipeline with the given name.
    pub fn new(name: &str) -> Self {
        Pipeline {
            name: name.to_string(),
            processors: Vec::new(),
        }
    }

    /// Add a processor to the pipeline.
    pub fn add<P: DataProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Execute the pipeline on a dataset.
    pub fn execute(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut current = input.clone();

        for processor in &self.processors {
            current = processor.process(&current)?;
        }

        Ok(current)
    }
}

impl DataProcessor for Pipeline {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        self.execute(input)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Custom("pipeline".to_string())
    }
}
