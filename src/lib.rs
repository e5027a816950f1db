//! # CitiBike Trip Analysis
//!
//! Batch analysis of bike-share trip records: four months of CSV files are
//! loaded into one in-memory typed table, derived columns are computed
//! (rider age, ride duration in minutes, distance traveled, gender label,
//! age bucket), and a sequence of grouped aggregate queries produces
//! summary tables for a human reader.
//!
//! ## Example
//!
//! ```rust
//! use citibike_trip_analysis::{
//!     data::{DataSet, DataType, Field, Row, Schema, Value},
//!     processing::{FilterProcessor, GroupByProcessor, Pipeline},
//! };
//!
//! let schema = Schema::new(vec![
//!     Field::new("category".to_string(), DataType::String, false),
//!     Field::new("minutes".to_string(), DataType::Float, false),
//! ]);
//!
//! let mut dataset = DataSet::new(schema);
//! dataset.add_row(Row::new(vec![
//!     Value::String("Subscriber".to_string()),
//!     Value::Float(12.5),
//! ])).unwrap();
//! dataset.add_row(Row::new(vec![
//!     Value::String("Customer".to_string()),
//!     Value::Float(30.0),
//! ])).unwrap();
//!
//! let pipeline = Pipeline::new("example")
//!     .add(FilterProcessor::not_null("minutes"))
//!     .add(GroupByProcessor::new()
//!         .group_by("category")
//!         .count("rides", "minutes")
//!         .mean("mean_minutes", "minutes"));
//!
//! let result = pipeline.execute(&dataset).unwrap();
//! assert_eq!(result.len(), 2);
//! ```

pub mod analysis;
pub mod data;
pub mod processing;
pub mod report;
pub mod utils;

// Re-export main types
pub use data::{DataSet, DataType, Field, Row, Schema, Value};
pub use processing::Pipeline;
pub use utils::Config;
