// Typed CSV ingestion for trip records

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDateTime;
use log::info;

use super::{DataError, DataSet, DataSource, DataType, Field, Row, Schema, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// CSV data source with a fixed, typed schema.
///
/// The file must carry a header row whose column names match the schema in
/// order. Any mismatch (header, column count, or cell that fails to coerce
/// to its declared type) is a fatal ingestion error.
pub struct CsvSource {
    path: String,
    schema: Schema,
}

impl CsvSource {
    /// Create a new CSV data source for the given schema.
    pub fn new<P: AsRef<Path>>(path: P, schema: Schema) -> Self {
        CsvSource {
            path: path.as_ref().to_string_lossy().to_string(),
            schema,
        }
    }

    fn check_header(&self, headers: &csv::StringRecord) -> Result<(), DataError> {
        if headers.len() != self.schema.fields.len() {
            return Err(DataError::SchemaMismatch(format!(
                "{}: header has {} columns, schema has {}",
                self.path,
                headers.len(),
                self.schema.fields.len()
            )));
        }

        for (field, header) in self.schema.fields.iter().zip(headers.iter()) {
            if field.name != header.trim() {
                return Err(DataError::SchemaMismatch(format!(
                    "{}: expected column '{}', found '{}'",
                    self.path,
                    field.name,
                    header.trim()
                )));
            }
        }

        Ok(())
    }

    fn coerce(&self, raw: &str, field: &Field, line: u64) -> Result<Value, DataError> {
        let raw = raw.trim();

        if raw.is_empty() {
            return if field.nullable {
                Ok(Value::Null)
            } else {
                Err(DataError::Parse(format!(
                    "{}:{}: column '{}' is empty but not nullable",
                    self.path, line, field.name
                )))
            };
        }

        match field.data_type {
            DataType::Boolean => raw.parse::<bool>().map(Value::Boolean).map_err(|_| {
                DataError::Parse(format!(
                    "{}:{}: column '{}': cannot parse '{}' as boolean",
                    self.path, line, field.name, raw
                ))
            }),
            DataType::Integer => raw.parse::<i64>().map(Value::Integer).map_err(|_| {
                DataError::Parse(format!(
                    "{}:{}: column '{}': cannot parse '{}' as integer",
                    self.path, line, field.name, raw
                ))
            }),
            DataType::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| {
                DataError::Parse(format!(
                    "{}:{}: column '{}': cannot parse '{}' as float",
                    self.path, line, field.name, raw
                ))
            }),
            DataType::String => Ok(Value::String(raw.to_string())),
            DataType::Timestamp => NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
                .map(Value::Timestamp)
                .map_err(|_| {
                    DataError::Parse(format!(
                        "{}:{}: column '{}': cannot parse '{}' as timestamp",
                        self.path, line, field.name, raw
                    ))
                }),
        }
    }
}

impl DataSource for CsvSource {
    fn read(&self) -> Result<DataSet, DataError> {
        let file = File::open(&self.path).map_err(|e| {
            DataError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", self.path, e),
            ))
        })?;
        let reader = BufReader::new(file);

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| DataError::Parse(e.to_string()))?
            .clone();
        self.check_header(&headers)?;

        let mut dataset = DataSet::new(self.schema.clone());

        for result in csv_reader.records() {
            let record = result.map_err(|e| DataError::Parse(e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.len() != self.schema.fields.len() {
                return Err(DataError::SchemaMismatch(format!(
                    "{}:{}: row has {} columns, schema has {}",
                    self.path,
                    line,
                    record.len(),
                    self.schema.fields.len()
                )));
            }

            let mut values = Vec::with_capacity(self.schema.fields.len());
            for (field, raw) in self.schema.fields.iter().zip(record.iter()) {
                values.push(self.coerce(raw, field, line)?);
            }

            dataset.add_row(Row::new(values))?;
        }

        dataset.metadata.add("source".to_string(), "csv".to_string());
        dataset.metadata.add("path".to_string(), self.path.clone());

        Ok(dataset)
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// Read every monthly CSV file and concatenate the rows, in input order,
/// into a single dataset. No deduplication; the first error aborts the load.
pub fn load_months<P: AsRef<Path>>(paths: &[P], schema: &Schema) -> Result<DataSet, DataError> {
    let mut combined = DataSet::new(schema.clone());
    let mut sources = Vec::new();

    for path in paths {
        let source = CsvSource::new(path, schema.clone());
        let month = source.read()?;
        info!("loaded {} rows from {}", month.len(), source.name());
        sources.push(source.name().to_string());

        for row in month.data {
            combined.add_row(row)?;
        }
    }

    combined
        .metadata
        .add("sources".to_string(), sources.join(","));

    Ok(combined)
}
