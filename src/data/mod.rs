// Data module: tabular structures for trip records

mod csv;
mod schema;

pub use csv::*;
pub use schema::*;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use thiserror::Error;

/// A source of tabular data.
pub trait DataSource {
    /// Read the source into an in-memory dataset.
    fn read(&self) -> Result<DataSet, DataError>;

    /// Get the source name (for logs and errors).
    fn name(&self) -> &str;
}

/// A dataset with schema and rows.
#[derive(Debug, Clone)]
pub struct DataSet {
    pub schema: Schema,
    pub data: Vec<Row>,
    pub metadata: Metadata,
}

impl DataSet {
    /// Create a new empty dataset.
    pub fn new(schema: Schema) -> Self {
        DataSet {
            schema,
            data: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Add a row to the dataset.
    pub fn add_row(&mut self, row: Row) -> Result<(), DataError> {
        if row.values.len() != self.schema.fields.len() {
            return Err(DataError::SchemaMismatch(format!(
                "row has {} values, schema has {} fields",
                row.values.len(),
                self.schema.fields.len()
            )));
        }

        self.data.push(row);
        Ok(())
    }

    /// Get the number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a reference to a row by index.
    pub fn get_row(&self, index: usize) -> Option<&Row> {
        self.data.get(index)
    }

    /// Get the value at (row, column name), if both exist.
    pub fn value_at(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.data.get(row).and_then(|r| r.get(idx))
    }
}

/// A row in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    /// Create a new row with the given values.
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    /// Get a reference to a value by index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// A single cell value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// View the value as f64 if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Total ordering used for sorting and deterministic group output.
    /// Null sorts after every non-null value; mixed numeric types compare
    /// as floats; other mixed types compare equal.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        }
    }
}

// Grouping keys live in hash maps, so Value needs Eq + Hash. Floats compare
// and hash by bit pattern, which gives exact-match grouping semantics.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Timestamp(t) => t.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{:.2}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Schema for a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema with the given fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    /// Get a reference to a field by name.
    pub fn get_field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get the positional index of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A field in a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    /// Create a new field.
    pub fn new(name: String, data_type: DataType, nullable: bool) -> Self {
        Field {
            name,
            data_type,
            nullable,
        }
    }
}

/// Data type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Boolean,
    Integer,
    Float,
    String,
    Timestamp,
}

/// Free-form metadata attached to a dataset.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub properties: HashMap<String, String>,
}

impl Metadata {
    /// Create new empty metadata.
    pub fn new() -> Self {
        Metadata {
            properties: HashMap::new(),
        }
    }

    /// Add a property to the metadata.
    pub fn add(&mut self, key: String, value: String) {
        self.properties.insert(key, value);
    }

    /// Get a property from the metadata.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }
}

/// Errors raised while reading or building datasets.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("validation error: {0}")]
    Validation(String),
}
