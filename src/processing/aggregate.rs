// Grouped aggregation over trip datasets

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::data::{DataSet, DataType, Field, Row, Schema, Value};
use super::{stats, DataProcessor, ProcessingError, ProcessorType};

/// An aggregation function with per-group state.
pub trait AggregateFunction: Send + Sync {
    /// Get the name of the aggregation function.
    fn name(&self) -> &str;

    /// Get the output data type of the aggregation function.
    fn output_type(&self, input_type: &DataType) -> DataType;

    /// Initialize the aggregation state.
    fn init(&self) -> Box<dyn std::any::Any + Send>;

    /// Update the aggregation state with a new value.
    fn update(&self, state: &mut Box<dyn std::any::Any + Send>, value: &Value);

    /// Finalize the aggregation and return the result.
    fn finalize(&self, state: Box<dyn std::any::Any + Send>) -> Value;
}

/// Count of non-null values.
pub struct CountFunction;

impl AggregateFunction for CountFunction {
    fn name(&self) -> &str {
        "count"
    }

    fn output_type(&self, _input_type: &DataType) -> DataType {
        DataType::Integer
    }

    fn init(&self) -> Box<dyn std::any::Any + Send> {
        Box::new(0i64)
    }

    fn update(&self, state: &mut Box<dyn std::any::Any + Send>, value: &Value) {
        if !matches!(value, Value::Null) {
            let count = state.downcast_mut::<i64>().unwrap();
            *count += 1;
        }
    }

    fn finalize(&self, state: Box<dyn std::any::Any + Send>) -> Value {
        Value::Integer(*state.downcast::<i64>().unwrap())
    }
}

/// Arithmetic mean of numeric values.
pub struct MeanFunction;

impl AggregateFunction for MeanFunction {
    fn name(&self) -> &str {
        "mean"
    }

    fn output_type(&self, _input_type: &DataType) -> DataType {
        DataType::Float
    }

    fn init(&self) -> Box<dyn std::any::Any + Send> {
        Box::new((0.0f64, 0i64)) // (sum, count)
    }

    fn update(&self, state: &mut Box<dyn std::any::Any + Send>, value: &Value) {
        if let Some(v) = value.as_f64() {
            let (sum, count) = state.downcast_mut::<(f64, i64)>().unwrap();
            *sum += v;
            *count += 1;
        }
    }

    fn finalize(&self, state: Box<dyn std::any::Any + Send>) -> Value {
        let (sum, count) = *state.downcast::<(f64, i64)>().unwrap();

        if count > 0 {
            Value::Float(sum / count as f64)
        } else {
            Value::Null
        }
    }
}

/// Minimum of numeric values.
pub struct MinFunction;

impl AggregateFunction for MinFunction {
    fn name(&self) -> &str {
        "min"
    }

    fn output_type(&self, input_type: &DataType) -> DataType {
        input_type.clone()
    }

    fn init(&self) -> Box<dyn std::any::Any + Send> {
        Box::new(None::<Value>)
    }

    fn update(&self, state: &mut Box<dyn std::any::Any + Send>, value: &Value) {
        if value.as_f64().is_none() {
            return;
        }

        let current = state.downcast_mut::<Option<Value>>().unwrap();
        let replace = match current {
            Some(best) => value.compare(best) == Ordering::Less,
            None => true,
        };

        if replace {
            *current = Some(value.clone());
        }
    }

    fn finalize(&self, state: Box<dyn std::any::Any + Send>) -> Value {
        let best = *state.downcast::<Option<Value>>().unwrap();
        best.unwrap_or(Value::Null)
    }
}

/// Maximum of numeric values.
pub struct MaxFunction;

impl AggregateFunction for MaxFunction {
    fn name(&self) -> &str {
        "max"
    }

    fn output_type(&self, input_type: &DataType) -> DataType {
        input_type.clone()
    }

    fn init(&self) -> Box<dyn std::any::Any + Send> {
        Box::new(None::<Value>)
    }

    fn update(&self, state: &mut Box<dyn std::any::Any + Send>, value: &Value) {
        if value.as_f64().is_none() {
            return;
        }

        let current = state.downcast_mut::<Option<Value>>().unwrap();
        let replace = match current {
            Some(best) => value.compare(best) == Ordering::Greater,
            None => true,
        };

        if replace {
            *current = Some(value.clone());
        }
    }

    fn finalize(&self, state: Box<dyn std::any::Any + Send>) -> Value {
        let best = *state.downcast::<Option<Value>>().unwrap();
        best.unwrap_or(Value::Null)
    }
}

/// Median (50th percentile) of numeric values. Collects the group's values
/// and sorts at finalize time; even-sized groups average the two middles.
pub struct MedianFunction;

impl AggregateFunction for MedianFunction {
    fn name(&self) -> &str {
        "median"
    }

    fn output_type(&self, _input_type: &DataType) -> DataType {
        DataType::Float
    }

    fn init(&self) -> Box<dyn std::any::Any + Send> {
        Box::new(Vec::<f64>::new())
    }

    fn update(&self, state: &mut Box<dyn std::any::Any + Send>, value: &Value) {
        if let Some(v) = value.as_f64() {
            state.downcast_mut::<Vec<f64>>().unwrap().push(v);
        }
    }

    fn finalize(&self, state: Box<dyn std::any::Any + Send>) -> Value {
        let values = *state.downcast::<Vec<f64>>().unwrap();

        if values.is_empty() {
            Value::Null
        } else {
            Value::Float(stats::median(&values))
        }
    }
}

/// Group-by processor: groups rows by one or more key columns and computes
/// one output column per aggregation. With rollup enabled it additionally
/// emits every key-prefix grouping set down to a grand total, with null in
/// the unused key positions.
///
/// Output rows are sorted by key values (nulls last), so totals follow the
/// groups they summarize and results are deterministic.
pub struct GroupByProcessor {
    group_by_columns: Vec<String>,
    aggregations: Vec<(String, String, Box<dyn AggregateFunction>)>, // (output, input column, function)
    rollup: bool,
}

impl GroupByProcessor {
    /// Create a new group-by processor.
    pub fn new() -> Self {
        GroupByProcessor {
            group_by_columns: Vec::new(),
            aggregations: Vec::new(),
            rollup: false,
        }
    }

    /// Add a column to group by.
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by_columns.push(column.to_string());
        self
    }

    /// Also emit key-prefix grouping sets, down to the grand total.
    pub fn with_rollup(mut self) -> Self {
        self.rollup = true;
        self
    }

    /// Add an aggregation.
    pub fn aggregate<F: AggregateFunction + 'static>(
        mut self,
        output_name: &str,
        input_column: &str,
        function: F,
    ) -> Self {
        self.aggregations.push((
            output_name.to_string(),
            input_column.to_string(),
            Box::new(function),
        ));
        self
    }

    /// Add a count aggregation.
    pub fn count(self, output_name: &str, input_column: &str) -> Self {
        self.aggregate(output_name, input_column, CountFunction)
    }

    /// Add a mean aggregation.
    pub fn mean(self, output_name: &str, input_column: &str) -> Self {
        self.aggregate(output_name, input_column, MeanFunction)
    }

    /// Add a min aggregation.
    pub fn min(self, output_name: &str, input_column: &str) -> Self {
        self.aggregate(output_name, input_column, MinFunction)
    }

    /// Add a max aggregation.
    pub fn max(self, output_name: &str, input_column: &str) -> Self {
        self.aggregate(output_name, input_column, MaxFunction)
    }

    /// Add a median aggregation.
    pub fn median(self, output_name: &str, input_column: &str) -> Self {
        self.aggregate(output_name, input_column, MedianFunction)
    }

    fn aggregate_set(
        &self,
        input: &DataSet,
        key_indices: &[usize],
        prefix_len: usize,
        agg_indices: &[usize],
        result: &mut DataSet,
    ) -> Result<(), ProcessingError> {
        let mut groups: HashMap<Vec<Value>, Vec<&Row>> = HashMap::new();

        for row in &input.data {
            let key: Vec<Value> = key_indices
                .iter()
                .enumerate()
                .map(|(pos, &i)| {
                    if pos < prefix_len {
                        row.values[i].clone()
                    } else {
                        Value::Null
                    }
                })
                .collect();

            groups.entry(key).or_default().push(row);
        }

        for (key, rows) in groups {
            let mut states: Vec<Box<dyn std::any::Any + Send>> = self
                .aggregations
                .iter()
                .map(|(_, _, function)| function.init())
                .collect();

            for row in rows {
                for (i, (_, _, function)) in self.aggregations.iter().enumerate() {
                    function.update(&mut states[i], &row.values[agg_indices[i]]);
                }
            }

            let mut values = key;
            for (state, (_, _, function)) in
                states.into_iter().zip(self.aggregations.iter())
            {
                values.push(function.finalize(state));
            }

            result.add_row(Row::new(values))?;
        }

        Ok(())
    }
}

impl Default for GroupByProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProcessor for GroupByProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        if self.aggregations.is_empty() {
            return Err(ProcessingError::InvalidArgument(
                "group-by requires at least one aggregation".to_string(),
            ));
        }

        // Resolve key columns
        let mut key_indices = Vec::new();
        let mut key_fields = Vec::new();

        for col in &self.group_by_columns {
            let idx = input.schema.index_of(col).ok_or_else(|| {
                ProcessingError::InvalidArgument(format!("group-by column '{}' not found", col))
            })?;
            key_indices.push(idx);

            // Rollup rows carry null keys, so key fields become nullable
            let mut field = input.schema.fields[idx].clone();
            field.nullable = field.nullable || self.rollup;
            key_fields.push(field);
        }

        // Resolve aggregation input columns
        let mut agg_indices = Vec::new();
        let mut agg_fields = Vec::new();

        for (output_name, input_column, function) in &self.aggregations {
            let idx = input.schema.index_of(input_column).ok_or_else(|| {
                ProcessingError::InvalidArgument(format!(
                    "aggregation column '{}' not found",
                    input_column
                ))
            })?;
            agg_indices.push(idx);

            let output_type = function.output_type(&input.schema.fields[idx].data_type);
            agg_fields.push(Field::new(output_name.clone(), output_type, true));
        }

        let mut output_fields = key_fields;
        output_fields.extend(agg_fields);
        let mut result = DataSet::new(Schema::new(output_fields));

        let key_count = key_indices.len();
        if self.rollup {
            for prefix_len in (0..=key_count).rev() {
                self.aggregate_set(input, &key_indices, prefix_len, &agg_indices, &mut result)?;
            }
        } else {
            self.aggregate_set(input, &key_indices, key_count, &agg_indices, &mut result)?;
        }

        // Deterministic output: sort rows by key values, nulls last
        result.data.sort_by(|a, b| {
            for i in 0..key_count {
                let ord = a.values[i].compare(&b.values[i]);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        for (key, value) in &input.metadata.properties {
            result.metadata.add(key.clone(), value.clone());
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "group_by"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Aggregate
    }
}
