// Analysis module: the concrete trip-summary queries

use log::{info, warn};

use crate::data::{DataSet, DataType, Value};
use crate::processing::{
    derived_columns, DataProcessor, FilterProcessor, GroupByProcessor, Pipeline, ProcessingError,
};
use crate::report::TopNProcessor;
use crate::utils::{validate_schema, AnalysisConfig};

/// Input columns the derivations read.
const REQUIRED_COLUMNS: &[(&str, DataType)] = &[
    ("trip_duration", DataType::Integer),
    ("start_station_id", DataType::Integer),
    ("start_station_latitude", DataType::Float),
    ("start_station_longitude", DataType::Float),
    ("end_station_id", DataType::Integer),
    ("end_station_latitude", DataType::Float),
    ("end_station_longitude", DataType::Float),
    ("birth_year", DataType::Integer),
    ("gender", DataType::Integer),
];

/// A titled summary table ready for rendering.
pub struct Report {
    pub title: String,
    pub table: DataSet,
}

/// Add every derived column to a raw trip dataset and log how many rides
/// fall outside the bucketed age range [10, 80). Those rides keep a null
/// age bucket and are absent from every bucketed report; the log makes the
/// gap visible rather than silent.
pub fn prepare(trips: &DataSet, config: &AnalysisConfig) -> Result<DataSet, ProcessingError> {
    validate_schema(trips, REQUIRED_COLUMNS).map_err(ProcessingError::InvalidArgument)?;

    let derived = derived_columns(config.reference_year).execute(trips)?;

    let bucket_idx = derived.schema.index_of("age_bucket").ok_or_else(|| {
        ProcessingError::InvalidOperation("derived dataset is missing age_bucket".to_string())
    })?;
    let unbucketed = derived
        .data
        .iter()
        .filter(|row| matches!(row.values[bucket_idx], Value::Null))
        .count();

    if unbucketed > 0 {
        warn!(
            "{} of {} rides have an age outside [10, 80) and fall in no age bucket",
            unbucketed,
            derived.len()
        );
    }

    Ok(derived)
}

/// count/mean/min/max/median of the measure column, grouped by the keys.
/// Round trips are excluded before grouping, as in every duration and
/// distance query.
fn summary(keys: &[&str], measure: &str, rollup: bool) -> Pipeline {
    let mut group = GroupByProcessor::new();
    for key in keys {
        group = group.group_by(key);
    }
    if rollup {
        group = group.with_rollup();
    }
    group = group
        .count("rides", measure)
        .mean("mean", measure)
        .min("min", measure)
        .max("max", measure)
        .median("median", measure);

    let mut pipeline =
        Pipeline::new("summary").add(FilterProcessor::round_trips_excluded());

    // Rows outside the bucketed age range carry a null bucket and are
    // excluded from bucketed reports.
    if keys.contains(&"age_bucket") {
        pipeline = pipeline.add(FilterProcessor::not_null("age_bucket"));
    }

    pipeline.add(group)
}

/// Ride duration statistics (minutes) by gender.
pub fn duration_by_gender(trips: &DataSet) -> Result<DataSet, ProcessingError> {
    summary(&["gender_label"], "ride_duration_min", false).execute(trips)
}

/// Ride duration statistics (minutes) by user type.
pub fn duration_by_user_type(trips: &DataSet) -> Result<DataSet, ProcessingError> {
    summary(&["user_type"], "ride_duration_min", false).execute(trips)
}

/// Ride duration statistics (minutes) by age bucket, with a rollup total
/// row across all buckets.
pub fn duration_by_age_bucket(trips: &DataSet) -> Result<DataSet, ProcessingError> {
    summary(&["age_bucket"], "ride_duration_min", true).execute(trips)
}

/// Distance statistics (miles) by user type.
pub fn distance_by_user_type(trips: &DataSet) -> Result<DataSet, ProcessingError> {
    summary(&["user_type"], "distance_mi", false).execute(trips)
}

/// Distance statistics (miles) by age bucket and gender.
pub fn distance_by_age_and_gender(trips: &DataSet) -> Result<DataSet, ProcessingError> {
    summary(&["age_bucket", "gender_label"], "distance_mi", false).execute(trips)
}

/// Distance statistics (miles) by age bucket and user type.
pub fn distance_by_age_and_user_type(trips: &DataSet) -> Result<DataSet, ProcessingError> {
    summary(&["age_bucket", "user_type"], "distance_mi", false).execute(trips)
}

/// Top-N age buckets by median ride duration. Buckets with fewer rides
/// than the configured minimum are excluded before ranking.
pub fn top_age_buckets_by_median_duration(
    trips: &DataSet,
    config: &AnalysisConfig,
) -> Result<DataSet, ProcessingError> {
    let grouped = summary(&["age_bucket"], "ride_duration_min", false).execute(trips)?;

    Pipeline::new("top_buckets")
        .add(FilterProcessor::at_least("rides", config.min_group_size as f64))
        .add(TopNProcessor::new("median", config.top_buckets))
        .execute(&grouped)
}

/// The gender with the highest mean trip distance.
pub fn top_gender_by_mean_distance(trips: &DataSet) -> Result<DataSet, ProcessingError> {
    let grouped = summary(&["gender_label"], "distance_mi", false).execute(trips)?;
    TopNProcessor::new("mean", 1).process(&grouped)
}

/// Run every query of the exercise against a prepared trip dataset.
pub fn reports(trips: &DataSet, config: &AnalysisConfig) -> Result<Vec<Report>, ProcessingError> {
    info!("running summary queries over {} trips", trips.len());

    let reports = vec![
        Report {
            title: "Ride duration (min) by gender".to_string(),
            table: duration_by_gender(trips)?,
        },
        Report {
            title: "Ride duration (min) by user type".to_string(),
            table: duration_by_user_type(trips)?,
        },
        Report {
            title: "Ride duration (min) by age bucket".to_string(),
            table: duration_by_age_bucket(trips)?,
        },
        Report {
            title: "Distance (mi) by user type".to_string(),
            table: distance_by_user_type(trips)?,
        },
        Report {
            title: "Distance (mi) by age bucket and gender".to_string(),
            table: distance_by_age_and_gender(trips)?,
        },
        Report {
            title: "Distance (mi) by age bucket and user type".to_string(),
            table: distance_by_age_and_user_type(trips)?,
        },
        Report {
            title: format!(
                "Top {} age buckets by median ride duration (>= {} rides)",
                config.top_buckets, config.min_group_size
            ),
            table: top_age_buckets_by_median_duration(trips, config)?,
        },
        Report {
            title: "Gender with the highest mean distance".to_string(),
            table: top_gender_by_mean_distance(trips)?,
        },
    ];

    Ok(reports)
}
