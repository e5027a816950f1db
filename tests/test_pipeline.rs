// Filter, aggregation, and reporting pipeline tests

use std::cmp::Ordering;

use citibike_trip_analysis::{
    data::{DataSet, DataType, Field, Row, Schema, Value},
    processing::{stats, FilterProcessor, DataProcessor, GroupByProcessor, Pipeline},
    report::{compare_on, render_table, SortProcessor, TopNProcessor},
};

fn ride_schema() -> Schema {
    Schema::new(vec![
        Field::new("start_station_id".to_string(), DataType::Integer, false),
        Field::new("end_station_id".to_string(), DataType::Integer, false),
        Field::new("category".to_string(), DataType::String, false),
        Field::new("minutes".to_string(), DataType::Float, false),
    ])
}

fn ride(start: i64, end: i64, category: &str, minutes: f64) -> Row {
    Row::new(vec![
        Value::Integer(start),
        Value::Integer(end),
        Value::String(category.to_string()),
        Value::Float(minutes),
    ])
}

fn sample_rides() -> DataSet {
    let mut dataset = DataSet::new(ride_schema());

    dataset.add_row(ride(100, 200, "A", 5.0)).unwrap();
    dataset.add_row(ride(100, 100, "A", 8.0)).unwrap(); // round trip
    dataset.add_row(ride(200, 300, "B", 15.0)).unwrap();
    dataset.add_row(ride(300, 300, "B", 3.0)).unwrap(); // round trip
    dataset.add_row(ride(300, 100, "B", 20.0)).unwrap();
    dataset.add_row(ride(100, 300, "A", 25.0)).unwrap();

    dataset
}

#[test]
fn test_round_trip_filter_removes_exactly_matching_rows() {
    let dataset = sample_rides();
    let round_trips = dataset
        .data
        .iter()
        .filter(|row| row.values[0] == row.values[1])
        .count();

    let filtered = FilterProcessor::round_trips_excluded()
        .process(&dataset)
        .unwrap();

    assert_eq!(round_trips, 2);
    assert_eq!(filtered.len(), dataset.len() - round_trips);
    for row in &filtered.data {
        assert_ne!(row.values[0], row.values[1]);
    }
}

#[test]
fn test_grouped_counts_partition_filtered_total() {
    let pipeline = Pipeline::new("counts")
        .add(FilterProcessor::round_trips_excluded())
        .add(
            GroupByProcessor::new()
                .group_by("category")
                .count("rides", "minutes"),
        );

    let dataset = sample_rides();
    let filtered_total = FilterProcessor::round_trips_excluded()
        .process(&dataset)
        .unwrap()
        .len() as i64;

    let grouped = pipeline.execute(&dataset).unwrap();

    let sum: i64 = grouped
        .data
        .iter()
        .map(|row| match row.values[1] {
            Value::Integer(n) => n,
            _ => 0,
        })
        .sum();

    assert_eq!(sum, filtered_total);
}

#[test]
fn test_group_by_computes_all_statistics() {
    let grouped = GroupByProcessor::new()
        .group_by("category")
        .count("rides", "minutes")
        .mean("mean", "minutes")
        .min("min", "minutes")
        .max("max", "minutes")
        .median("median", "minutes")
        .process(&sample_rides())
        .unwrap();

    // keys sort ascending, so A comes first
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped.value_at(0, "category"), Some(&Value::String("A".to_string())));
    assert_eq!(grouped.value_at(0, "rides"), Some(&Value::Integer(3)));
    // A holds 5.0, 8.0, 25.0
    assert_eq!(grouped.value_at(0, "mean"), Some(&Value::Float(38.0 / 3.0)));
    assert_eq!(grouped.value_at(0, "min"), Some(&Value::Float(5.0)));
    assert_eq!(grouped.value_at(0, "max"), Some(&Value::Float(25.0)));
    assert_eq!(grouped.value_at(0, "median"), Some(&Value::Float(8.0)));
}

#[test]
fn test_median_shifts_less_than_mean_under_outlier() {
    let base = [10.0, 12.0, 14.0, 16.0];
    let with_outlier = [10.0, 12.0, 14.0, 16.0, 1000.0];

    let mean_shift = (stats::mean(&with_outlier) - stats::mean(&base)).abs();
    let median_shift = (stats::median(&with_outlier) - stats::median(&base)).abs();

    assert!(median_shift < mean_shift);
}

#[test]
fn test_median_of_even_group_averages_middles() {
    assert_eq!(stats::median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    assert_eq!(stats::median(&[3.0, 1.0, 2.0]), 2.0);
}

#[test]
fn test_rollup_emits_grand_total_last() {
    let grouped = GroupByProcessor::new()
        .group_by("category")
        .with_rollup()
        .count("rides", "minutes")
        .process(&sample_rides())
        .unwrap();

    // two categories plus the total row, nulls sorted last
    assert_eq!(grouped.len(), 3);
    let total = grouped.get_row(2).unwrap();
    assert_eq!(total.values[0], Value::Null);
    assert_eq!(total.values[1], Value::Integer(6));
}

#[test]
fn test_top_n_sorts_descending_with_stable_ties() {
    let mut dataset = DataSet::new(ride_schema());
    dataset.add_row(ride(1, 2, "first", 10.0)).unwrap();
    dataset.add_row(ride(3, 4, "tied_a", 20.0)).unwrap();
    dataset.add_row(ride(5, 6, "tied_b", 20.0)).unwrap();
    dataset.add_row(ride(7, 8, "last", 5.0)).unwrap();

    let top = TopNProcessor::new("minutes", 3).process(&dataset).unwrap();

    assert_eq!(top.len(), 3);
    // ties keep their input order
    assert_eq!(top.value_at(0, "category"), Some(&Value::String("tied_a".to_string())));
    assert_eq!(top.value_at(1, "category"), Some(&Value::String("tied_b".to_string())));
    assert_eq!(top.value_at(2, "category"), Some(&Value::String("first".to_string())));

    assert_eq!(compare_on(&top, 0, 1, "minutes"), Some(Ordering::Equal));
    assert_eq!(compare_on(&top, 1, 2, "minutes"), Some(Ordering::Greater));
}

#[test]
fn test_sort_ascending_orders_by_column() {
    let sorted = SortProcessor::ascending("minutes")
        .process(&sample_rides())
        .unwrap();

    let minutes: Vec<f64> = sorted
        .data
        .iter()
        .filter_map(|row| row.values[3].as_f64())
        .collect();

    for pair in minutes.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
}

#[test]
fn test_at_least_filters_small_groups() {
    let grouped = GroupByProcessor::new()
        .group_by("category")
        .count("rides", "minutes")
        .process(&sample_rides())
        .unwrap();

    let kept = FilterProcessor::at_least("rides", 3.0)
        .process(&grouped)
        .unwrap();

    assert_eq!(kept.len(), 2); // both categories have 3 rides

    let kept = FilterProcessor::at_least("rides", 4.0)
        .process(&grouped)
        .unwrap();
    assert!(kept.is_empty());
}

#[test]
fn test_equals_filter() {
    let filtered = FilterProcessor::equals("category", Value::String("B".to_string()))
        .process(&sample_rides())
        .unwrap();

    assert_eq!(filtered.len(), 3);
}

#[test]
fn test_render_table_shows_rollup_total_as_all() {
    let grouped = GroupByProcessor::new()
        .group_by("category")
        .with_rollup()
        .count("rides", "minutes")
        .process(&sample_rides())
        .unwrap();

    let rendered = render_table(&grouped);
    let lines: Vec<&str> = rendered.lines().collect();

    assert!(lines[0].contains("category"));
    assert!(lines[0].contains("rides"));
    assert!(lines.last().unwrap().starts_with("All"));
}
