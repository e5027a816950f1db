// Derived-column and end-to-end query tests

use chrono::NaiveDateTime;

use citibike_trip_analysis::{
    analysis,
    data::{trip_schema, DataSet, DataType, Field, Row, Schema, Value},
    processing::{bucket_for_age, gender_name, planar_distance_miles},
    utils::AnalysisConfig,
};

fn ts(s: &str) -> Value {
    Value::Timestamp(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap())
}

#[allow(clippy::too_many_arguments)]
fn trip(
    duration_s: i64,
    start_id: i64,
    start_lat: f64,
    start_lon: f64,
    end_id: i64,
    end_lat: f64,
    end_lon: f64,
    user_type: &str,
    birth_year: i64,
    gender: i64,
) -> Row {
    Row::new(vec![
        Value::Integer(duration_s),
        ts("2021-02-01 08:00:00"),
        ts("2021-02-01 09:00:00"),
        Value::Integer(start_id),
        Value::String(format!("Station {}", start_id)),
        Value::Float(start_lat),
        Value::Float(start_lon),
        Value::Integer(end_id),
        Value::String(format!("Station {}", end_id)),
        Value::Float(end_lat),
        Value::Float(end_lon),
        Value::Integer(9000 + start_id),
        Value::String(user_type.to_string()),
        Value::Integer(birth_year),
        Value::Integer(gender),
    ])
}

fn sample_trips() -> DataSet {
    let mut dataset = DataSet::new(trip_schema());

    // 5 min, Male subscriber aged 31, across town
    dataset
        .add_row(trip(300, 100, 40.7128, -74.0060, 200, 40.7306, -73.9352, "Subscriber", 1990, 1))
        .unwrap();
    // 10 min round trip, excluded from every aggregate
    dataset
        .add_row(trip(600, 100, 40.7128, -74.0060, 100, 40.7128, -74.0060, "Subscriber", 1990, 1))
        .unwrap();
    // 15 min, Female customer aged 21
    dataset
        .add_row(trip(900, 200, 40.7306, -73.9352, 300, 40.7400, -73.9900, "Customer", 2000, 2))
        .unwrap();
    // 20 min, Female customer aged 21
    dataset
        .add_row(trip(1200, 300, 40.7400, -73.9900, 100, 40.7128, -74.0060, "Customer", 2000, 2))
        .unwrap();
    // 25 min, unknown gender, age 91 falls in no bucket
    dataset
        .add_row(trip(1500, 100, 40.7128, -74.0060, 300, 40.7400, -73.9900, "Subscriber", 1930, 0))
        .unwrap();

    dataset
}

fn prepared() -> DataSet {
    analysis::prepare(&sample_trips(), &AnalysisConfig::default()).unwrap()
}

#[test]
fn test_age_bucket_boundaries() {
    assert_eq!(bucket_for_age(9), None);
    assert_eq!(bucket_for_age(10), Some("[10-20)".to_string()));
    assert_eq!(bucket_for_age(19), Some("[10-20)".to_string()));
    assert_eq!(bucket_for_age(20), Some("[20-30)".to_string()));
    assert_eq!(bucket_for_age(45), Some("[40-50)".to_string()));
    assert_eq!(bucket_for_age(79), Some("[70-80)".to_string()));
    assert_eq!(bucket_for_age(80), None);
}

#[test]
fn test_distance_is_symmetric_and_matches_known_value() {
    let (lat1, lon1) = (40.7128, -74.0060);
    let (lat2, lon2) = (40.7306, -73.9352);

    let forward = planar_distance_miles(lat1, lon1, lat2, lon2);
    let backward = planar_distance_miles(lat2, lon2, lat1, lon1);

    // lower Manhattan to the East Village and back is just under 4 miles
    assert!((forward - 3.907).abs() < 0.01, "forward = {}", forward);
    // the cosine term references the start latitude, so the swap is not
    // bit-exact, but at city scale it agrees to well under a tenth of a mile
    assert!((forward - backward).abs() < 0.01);
}

#[test]
fn test_gender_labels() {
    assert_eq!(gender_name(1), "Male");
    assert_eq!(gender_name(2), "Female");
    assert_eq!(gender_name(0), "Unknown");
    assert_eq!(gender_name(7), "Unknown");
}

#[test]
fn test_prepare_adds_derived_columns() {
    let trips = prepared();

    assert_eq!(trips.value_at(0, "age"), Some(&Value::Integer(31)));
    assert_eq!(trips.value_at(0, "ride_duration_min"), Some(&Value::Float(5.0)));
    assert_eq!(
        trips.value_at(0, "gender_label"),
        Some(&Value::String("Male".to_string()))
    );
    assert_eq!(
        trips.value_at(0, "age_bucket"),
        Some(&Value::String("[30-40)".to_string()))
    );

    // age 91 maps to no bucket
    assert_eq!(trips.value_at(4, "age_bucket"), Some(&Value::Null));

    // first trip covers the known coordinate pair
    match trips.value_at(0, "distance_mi") {
        Some(Value::Float(d)) => assert!((d - 3.907).abs() < 0.01),
        other => panic!("expected distance, got {:?}", other),
    }
}

#[test]
fn test_prepare_rejects_wrong_schema() {
    let schema = Schema::new(vec![Field::new(
        "trip_duration".to_string(),
        DataType::Integer,
        false,
    )]);
    let dataset = DataSet::new(schema);

    assert!(analysis::prepare(&dataset, &AnalysisConfig::default()).is_err());
}

#[test]
fn test_duration_by_gender_excludes_round_trips() {
    let result = analysis::duration_by_gender(&prepared()).unwrap();

    // keys sort ascending: Female, Male, Unknown
    assert_eq!(result.len(), 3);
    assert_eq!(
        result.value_at(0, "gender_label"),
        Some(&Value::String("Female".to_string()))
    );
    assert_eq!(result.value_at(0, "rides"), Some(&Value::Integer(2)));
    assert_eq!(result.value_at(0, "mean"), Some(&Value::Float(17.5)));

    // the Male round trip is gone: one ride, not two
    assert_eq!(
        result.value_at(1, "gender_label"),
        Some(&Value::String("Male".to_string()))
    );
    assert_eq!(result.value_at(1, "rides"), Some(&Value::Integer(1)));
    assert_eq!(result.value_at(1, "median"), Some(&Value::Float(5.0)));
}

#[test]
fn test_duration_by_age_bucket_has_rollup_total() {
    let result = analysis::duration_by_age_bucket(&prepared()).unwrap();

    // [20-30), [30-40), then the total; the unbucketed age-91 ride is absent
    assert_eq!(result.len(), 3);
    assert_eq!(
        result.value_at(0, "age_bucket"),
        Some(&Value::String("[20-30)".to_string()))
    );
    assert_eq!(result.value_at(0, "rides"), Some(&Value::Integer(2)));
    assert_eq!(
        result.value_at(1, "age_bucket"),
        Some(&Value::String("[30-40)".to_string()))
    );

    let total = result.get_row(2).unwrap();
    assert_eq!(total.values[0], Value::Null);
    assert_eq!(result.value_at(2, "rides"), Some(&Value::Integer(3)));
}

#[test]
fn test_distance_by_age_and_gender_groups_on_both_keys() {
    let result = analysis::distance_by_age_and_gender(&prepared()).unwrap();

    // [20-30)/Female and [30-40)/Male
    assert_eq!(result.len(), 2);
    assert_eq!(
        result.value_at(0, "age_bucket"),
        Some(&Value::String("[20-30)".to_string()))
    );
    assert_eq!(
        result.value_at(0, "gender_label"),
        Some(&Value::String("Female".to_string()))
    );
    assert_eq!(result.value_at(0, "rides"), Some(&Value::Integer(2)));
}

#[test]
fn test_top_age_buckets_respects_min_group_size() {
    let config = AnalysisConfig {
        min_group_size: 2,
        top_buckets: 1,
        ..AnalysisConfig::default()
    };

    let result =
        analysis::top_age_buckets_by_median_duration(&prepared(), &config).unwrap();

    // only [20-30) reaches two rides; its median is (15 + 20) / 2
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.value_at(0, "age_bucket"),
        Some(&Value::String("[20-30)".to_string()))
    );
    assert_eq!(result.value_at(0, "median"), Some(&Value::Float(17.5)));
}

#[test]
fn test_top_gender_by_mean_distance_returns_one_row() {
    let result = analysis::top_gender_by_mean_distance(&prepared()).unwrap();

    assert_eq!(result.len(), 1);
    assert!(matches!(
        result.value_at(0, "gender_label"),
        Some(Value::String(_))
    ));
}

#[test]
fn test_reports_cover_every_query() {
    let reports = analysis::reports(&prepared(), &AnalysisConfig::default()).unwrap();

    assert_eq!(reports.len(), 8);
    for report in &reports {
        assert!(!report.title.is_empty());
    }
}
