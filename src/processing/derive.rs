// Derived columns computed from trip records

use crate::data::{DataSet, DataType, Field, Row, Schema, Value, GENDER_FEMALE, GENDER_MALE};
use super::{DataProcessor, Pipeline, ProcessingError, ProcessorType};

/// Miles spanned by one degree of latitude.
const MILES_PER_DEGREE: f64 = 69.1;
/// Degrees per radian, as fixed in the distance formula.
const DEGREES_PER_RADIAN: f64 = 57.3;

/// Lower and upper bound (half-open) of the bucketed age range.
const BUCKET_MIN_AGE: i64 = 10;
const BUCKET_MAX_AGE: i64 = 80;

/// Add a computed column to a dataset.
pub struct AddColumnTransform {
    name: String,
    data_type: DataType,
    nullable: bool,
    generator: Box<dyn Fn(&Row, &DataSet) -> Value>,
}

impl AddColumnTransform {
    /// Create a new add-column transform with a generator function.
    pub fn new<F>(name: &str, data_type: DataType, nullable: bool, generator: F) -> Self
    where
        F: Fn(&Row, &DataSet) -> Value + 'static,
    {
        AddColumnTransform {
            name: name.to_string(),
            data_type,
            nullable,
            generator: Box::new(generator),
        }
    }
}

impl DataProcessor for AddColumnTransform {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        if input.schema.index_of(&self.name).is_some() {
            return Err(ProcessingError::InvalidArgument(format!(
                "column '{}' already exists",
                self.name
            )));
        }

        let mut fields = input.schema.fields.clone();
        fields.push(Field::new(
            self.name.clone(),
            self.data_type.clone(),
            self.nullable,
        ));

        let schema = Schema::new(fields);
        let mut result = DataSet::new(schema);

        for row in &input.data {
            let mut values = row.values.clone();
            values.push((self.generator)(row, input));
            result.add_row(Row::new(values))?;
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
        ProcessorType::Transform
    }
}

fn column_value<'a>(row: &'a Row, dataset: &DataSet, column: &str) -> Option<&'a Value> {
    dataset.schema.index_of(column).and_then(|i| row.get(i))
}

/// Rider age, computed as |birth_year - reference_year|.
pub fn rider_age(reference_year: i64) -> AddColumnTransform {
    AddColumnTransform::new("age", DataType::Integer, false, move |row, dataset| {
        match column_value(row, dataset, "birth_year") {
            Some(Value::Integer(year)) => Value::Integer((year - reference_year).abs()),
            _ => Value::Null,
        }
    })
}

/// Ride duration converted from seconds to minutes.
pub fn duration_minutes() -> AddColumnTransform {
    AddColumnTransform::new(
        "ride_duration_min",
        DataType::Float,
        false,
        |row, dataset| match column_value(row, dataset, "trip_duration") {
            Some(Value::Integer(seconds)) => Value::Float(*seconds as f64 / 60.0),
            _ => Value::Null,
        },
    )
}

/// Distance between two coordinates in miles, using a flat-earth
/// approximation: latitude delta scaled by 69.1 mi/degree, longitude delta
/// additionally corrected by the cosine of the start latitude in radians.
/// Valid at the small distances a bike ride covers.
pub fn planar_distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = MILES_PER_DEGREE * (lat1 - lat2);
    let dlon = MILES_PER_DEGREE * (lon2 - lon1) * (lat1 / DEGREES_PER_RADIAN).cos();
    (dlat * dlat + dlon * dlon).sqrt()
}

/// Distance traveled between start and end station, in miles.
pub fn trip_distance_miles() -> AddColumnTransform {
    AddColumnTransform::new("distance_mi", DataType::Float, false, |row, dataset| {
        let lat1 = column_value(row, dataset, "start_station_latitude").and_then(Value::as_f64);
        let lon1 = column_value(row, dataset, "start_station_longitude").and_then(Value::as_f64);
        let lat2 = column_value(row, dataset, "end_station_latitude").and_then(Value::as_f64);
        let lon2 = column_value(row, dataset, "end_station_longitude").and_then(Value::as_f64);

        match (lat1, lon1, lat2, lon2) {
            (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) => {
                Value::Float(planar_distance_miles(lat1, lon1, lat2, lon2))
            }
            _ => Value::Null,
        }
    })
}

/// Categorical label for a numeric gender code.
pub fn gender_name(code: i64) -> &'static str {
    match code {
        GENDER_MALE => "Male",
        GENDER_FEMALE => "Female",
        _ => "Unknown",
    }
}

/// Gender label column derived from the numeric gender code.
pub fn gender_label() -> AddColumnTransform {
    AddColumnTransform::new("gender_label", DataType::String, false, |row, dataset| {
        match column_value(row, dataset, "gender") {
            Some(Value::Integer(code)) => Value::String(gender_name(*code).to_string()),
            _ => Value::String("Unknown".to_string()),
        }
    })
}

/// Half-open decade bucket label for an age, "[10-20)" through "[70-80)".
/// Ages outside [10, 80) fall in no bucket.
pub fn bucket_for_age(age: i64) -> Option<String> {
    if age < BUCKET_MIN_AGE || age >= BUCKET_MAX_AGE {
        return None;
    }

    let low = age / 10 * 10;
    Some(format!("[{}-{})", low, low + 10))
}

/// Age bucket column derived from the age column; null outside [10, 80).
pub fn age_bucket() -> AddColumnTransform {
    AddColumnTransform::new("age_bucket", DataType::String, true, |row, dataset| {
        match column_value(row, dataset, "age") {
            Some(Value::Integer(age)) => match bucket_for_age(*age) {
                Some(label) => Value::String(label),
                None => Value::Null,
            },
            _ => Value::Null,
        }
    })
}

/// Pipeline adding every derived column to a raw trip dataset.
/// Order matters: the age bucket is derived from the age column.
pub fn derived_columns(reference_year: i64) -> Pipeline {
    Pipeline::new("derived_columns")
        .add(rider_age(reference_year))
        .add(duration_minutes())
        .add(trip_distance_miles())
        .add(gender_label())
        .add(age_bucket())
}
