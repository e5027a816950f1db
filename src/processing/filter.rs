// Row filters applied before grouping

use crate::data::{DataSet, Row, Value};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Filter rows based on a predicate.
pub struct FilterProcessor {
    name: String,
    predicate: Box<dyn Fn(&Row, &DataSet) -> bool>,
}

impl FilterProcessor {
    /// Create a new filter processor with a predicate function.
    pub fn new<F>(name: &str, predicate: F) -> Self
    where
        F: Fn(&Row, &DataSet) -> bool + 'static,
    {
        FilterProcessor {
            name: name.to_string(),
            predicate: Box::new(predicate),
        }
    }

    /// Keep rows where a column equals a value.
    pub fn equals(column: &str, value: Value) -> Self {
        let column = column.to_string();
        Self::new(&format!("equals_{}", column), move |row, dataset| {
            match dataset.schema.index_of(&column) {
                Some(i) => row.values[i] == value,
                None => false,
            }
        })
    }

    /// Keep rows where a column is not null.
    pub fn not_null(column: &str) -> Self {
        let column = column.to_string();
        Self::new(&format!("not_null_{}", column), move |row, dataset| {
            match dataset.schema.index_of(&column) {
                Some(i) => !matches!(row.values[i], Value::Null),
                None => false,
            }
        })
    }

    /// Keep rows where a numeric column is at least the given value.
    pub fn at_least(column: &str, value: f64) -> Self {
        let column = column.to_string();
        Self::new(&format!("at_least_{}", column), move |row, dataset| {
            match dataset.schema.index_of(&column) {
                Some(i) => row.values[i].as_f64().map_or(false, |v| v >= value),
                None => false,
            }
        })
    }

    /// Keep rows where two columns hold different values.
    pub fn columns_differ(left: &str, right: &str) -> Self {
        let left = left.to_string();
        let right = right.to_string();
        Self::new(
            &format!("differ_{}_{}", left, right),
            move |row, dataset| {
                match (
                    dataset.schema.index_of(&left),
                    dataset.schema.index_of(&right),
                ) {
                    (Some(a), Some(b)) => row.values[a] != row.values[b],
                    _ => false,
                }
            },
        )
    }

    /// Exclude round trips: rides that start and end at the same station.
    pub fn round_trips_excluded() -> Self {
        Self::columns_differ("start_station_id", "end_station_id")
    }
}

impl DataProcessor for FilterProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut result = DataSet::new(input.schema.clone());

        for row in &input.data {
            if (self.predicate)(row, input) {
                result.add_row(row.clone())?;
            }
        }

        for (key, value) in &input.metadata.properties {
            result.metadata.add(key.clone(), value.clone());
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Filter
    }
}

/// Limit the number of rows in a dataset.
pub struct LimitProcessor {
    limit: usize,
}

impl LimitProcessor {
    /// Create a new limit processor.
    pub fn new(limit: usize) -> Self {
        LimitProcessor { limit }
    }
}

impl DataProcessor for LimitProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut result = DataSet::new(input.schema.clone());

        for row in input.data.iter().take(self.limit) {
            result.add_row(row.clone())?;
        }

        for (key, value) in &input.metadata.properties {
            result.metadata.add(key.clone(), value.clone());
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "limit"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Filter
    }
}
