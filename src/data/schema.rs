// Schema construction and the fixed trip-record schema

use super::{DataType, Field, Schema};

/// Gender code carried in the source data.
pub const GENDER_UNKNOWN: i64 = 0;
pub const GENDER_MALE: i64 = 1;
pub const GENDER_FEMALE: i64 = 2;

/// Schema builder for creating schemas.
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Create a new schema builder.
    pub fn new() -> Self {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Add a field to the schema.
    pub fn add_field(mut self, name: &str, data_type: DataType, nullable: bool) -> Self {
        self.fields
            .push(Field::new(name.to_string(), data_type, nullable));
        self
    }

    /// Add an integer field.
    pub fn add_integer(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::Integer, nullable)
    }

    /// Add a float field.
    pub fn add_float(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::Float, nullable)
    }

    /// Add a string field.
    pub fn add_string(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::String, nullable)
    }

    /// Add a timestamp field.
    pub fn add_timestamp(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::Timestamp, nullable)
    }

    /// Build the schema.
    pub fn build(self) -> Schema {
        Schema::new(self.fields)
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed 15-column CitiBike trip schema. One row per ride:
/// duration in seconds, start/stop times, start and end station
/// (id, name, lat, long), bike id, user type ("Customer" or "Subscriber"),
/// birth year, and gender code (0=Unknown, 1=Male, 2=Female).
pub fn trip_schema() -> Schema {
    SchemaBuilder::new()
        .add_integer("trip_duration", false)
        .add_timestamp("start_time", false)
        .add_timestamp("stop_time", false)
        .add_integer("start_station_id", false)
        .add_string("start_station_name", false)
        .add_float("start_station_latitude", false)
        .add_float("start_station_longitude", false)
        .add_integer("end_station_id", false)
        .add_string("end_station_name", false)
        .add_float("end_station_latitude", false)
        .add_float("end_station_longitude", false)
        .add_integer("bike_id", false)
        .add_string("user_type", false)
        .add_integer("birth_year", false)
        .add_integer("gender", false)
        .build()
}
