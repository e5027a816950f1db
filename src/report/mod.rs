// Report module: ordering, truncation, and table rendering

use std::cmp::Ordering;

use crate::data::{DataSet, Value};
use crate::processing::{DataProcessor, LimitProcessor, ProcessingError, ProcessorType};

/// Sort a dataset by a single column. The sort is stable, so rows that
/// compare equal keep their input order.
pub struct SortProcessor {
    column: String,
    descending: bool,
}

impl SortProcessor {
    /// Sort ascending by the given column.
    pub fn ascending(column: &str) -> Self {
        SortProcessor {
            column: column.to_string(),
            descending: false,
        }
    }

    /// Sort descending by the given column.
    pub fn descending(column: &str) -> Self {
        SortProcessor {
            column: column.to_string(),
            descending: true,
        }
    }
}

impl DataProcessor for SortProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let idx = input.schema.index_of(&self.column).ok_or_else(|| {
            ProcessingError::InvalidArgument(format!("sort column '{}' not found", self.column))
        })?;

        let mut result = input.clone();
        result.data.sort_by(|a, b| {
            let ord = a.values[idx].compare(&b.values[idx]);
            if self.descending {
                ord.reverse()
            } else {
                ord
            }
        });

        Ok(result)
    }

    fn name(&self) -> &str {
        "sort"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Report
    }
}

/// Keep the top N rows by a metric column, sorted descending.
pub struct TopNProcessor {
    metric: String,
    n: usize,
}

impl TopNProcessor {
    /// Create a new top-N processor over the given metric column.
    pub fn new(metric: &str, n: usize) -> Self {
        TopNProcessor {
            metric: metric.to_string(),
            n,
        }
    }
}

impl DataProcessor for TopNProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let sorted = SortProcessor::descending(&self.metric).process(input)?;
        LimitProcessor::new(self.n).process(&sorted)
    }

    fn name(&self) -> &str {
        "top_n"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Report
    }
}

/// Render a dataset as a fixed-width plain-text table for the terminal.
/// Null cells render as "All": the only nulls reaching a report are rollup
/// key positions, which stand for every value of that key.
pub fn render_table(dataset: &DataSet) -> String {
    let headers: Vec<String> = dataset
        .schema
        .fields
        .iter()
        .map(|f| f.name.clone())
        .collect();

    let rows: Vec<Vec<String>> = dataset
        .data
        .iter()
        .map(|row| row.values.iter().map(render_cell).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::new();
    render_row(&mut out, &headers, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    render_row(&mut out, &rule, &widths);

    for row in &rows {
        render_row(&mut out, row, &widths);
    }

    out
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "All".to_string(),
        other => other.to_string(),
    }
}

fn render_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&format!("{:<width$}", cell, width = widths[i]));
    }
    out.push('\n');
}

/// Compare two rows of a dataset on a column, for callers that need the
/// reporter's ordering outside a processor.
pub fn compare_on(dataset: &DataSet, a: usize, b: usize, column: &str) -> Option<Ordering> {
    let idx = dataset.schema.index_of(column)?;
    let left = dataset.get_row(a)?.get(idx)?;
    let right = dataset.get_row(b)?.get(idx)?;
    Some(left.compare(right))
}
