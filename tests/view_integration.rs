//! Integration tests for the view aggregation pipeline
//!
//! These tests validate the complete path from recorded samples to collected
//! rows:
//! - Tag projection and group signature identity
//! - Distribution, sum, and mean accumulation per group
//! - View canonicalization observable through the registry
//! - Clearing and rebuilding collection state
//! - Registry dispatch across multiple views of one measure

use statsview::aggregation::{Aggregation, AggregationData};
use statsview::types::{Measure, Tag, TagKey, TagSet};
use statsview::view::{Row, View, ViewRegistry};

// ============================================================================
// Helper Functions
// ============================================================================

fn test_measure(name: &str) -> Measure {
    Measure::new(name, "", "1")
}

fn subscribed_view(tag_keys: &[&str], aggregation: Aggregation) -> View {
    let mut view = View::new(
        test_measure("test_measure"),
        tag_keys.iter().map(|k| TagKey::new(*k)).collect(),
        aggregation,
    );
    view.canonicalize().expect("canonicalize");
    view.subscribe();
    view
}

fn tag_set(pairs: &[(&str, &str)]) -> TagSet {
    TagSet::from_pairs(pairs.iter().copied())
}

fn row(tags: &[(&str, &str)], data: AggregationData) -> Row {
    Row::new(
        tags
            .iter()
            .map(|(k, v)| Tag::new(TagKey::new(*k), *v))
            .collect(),
        data,
    )
}

/// Replay values into a fresh accumulator to build an expected row payload.
fn replay(aggregation: &Aggregation, values: &[f64]) -> AggregationData {
    let mut data = aggregation.new_data();
    for &v in values {
        data.add_sample(v, 0);
    }
    data
}

fn contains_row(rows: &[Row], want: &Row) -> bool {
    rows.iter().any(|r| r == want)
}

/// Row order is unspecified, so compare collected rows as sets.
fn assert_same_rows(got: &[Row], want: &[Row]) {
    for r in got {
        assert!(contains_row(want, r), "unexpected row: {:?}", r);
    }
    for r in want {
        assert!(contains_row(got, r), "missing row: {:?}", r);
    }
}

// ============================================================================
// Distribution Views
// ============================================================================

#[test]
fn test_distribution_view_single_group() {
    let view = subscribed_view(&["k1"], Aggregation::distribution(vec![2.0]).unwrap());

    view.add_sample(&tag_set(&[("k1", "v1")]), 1.0).unwrap();
    view.add_sample(&tag_set(&[("k1", "v1")]), 5.0).unwrap();

    let rows = view.collected_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].tags,
        vec![Tag::new(TagKey::new("k1"), "v1")]
    );

    match &rows[0].data {
        AggregationData::Distribution(d) => {
            assert_eq!(d.count(), 2);
            assert_eq!(d.min(), 1.0);
            assert_eq!(d.max(), 5.0);
            assert_eq!(d.mean(), 3.0);
            assert_eq!(d.sum_of_squared_deviation(), 8.0);
            assert_eq!(d.bucket_counts(), &[1, 1]);
        }
        other => panic!("expected distribution data, got {:?}", other),
    }
}

#[test]
fn test_distribution_view_groups_by_key_subset() {
    let agg = Aggregation::distribution(vec![2.0]).unwrap();
    let view = subscribed_view(&["k1", "k2"], agg.clone());

    // k3 is not part of the view's keys and must not split groups.
    let records: &[(f64, &[(&str, &str)])] = &[
        (1.0, &[("k1", "v1")]),
        (5.0, &[("k1", "v1"), ("k3", "v3")]),
        (1.0, &[("k1", "v1 other")]),
        (5.0, &[("k2", "v2")]),
        (5.0, &[("k1", "v1"), ("k2", "v2")]),
    ];
    for (value, tags) in records {
        view.add_sample(&tag_set(tags), *value).unwrap();
    }

    let want = vec![
        row(&[("k1", "v1")], replay(&agg, &[1.0, 5.0])),
        row(&[("k1", "v1 other")], replay(&agg, &[1.0])),
        row(&[("k2", "v2")], replay(&agg, &[5.0])),
        row(&[("k1", "v1"), ("k2", "v2")], replay(&agg, &[5.0])),
    ];
    assert_same_rows(&view.collected_rows(), &want);
}

#[test]
fn test_distribution_view_repeated_groups_accumulate() {
    let agg = Aggregation::distribution(vec![2.0]).unwrap();
    let view = subscribed_view(&["k1", "k2"], agg.clone());

    let records: &[(f64, &[(&str, &str)])] = &[
        (1.0, &[("k1", "v1x")]),
        (5.0, &[("k1", "v1x"), ("k3", "v3")]),
        (1.0, &[("k1", "v1y")]),
        (1.0, &[("k1", "v1x"), ("k2", "v2x")]),
        (5.0, &[("k1", "v1x"), ("k2", "v2x")]),
        (3.0, &[("k1", "v1x"), ("k2", "v2x")]),
        (3.0, &[("k1", "v1x"), ("k2", "v2x")]),
    ];
    for (value, tags) in records {
        view.add_sample(&tag_set(tags), *value).unwrap();
    }

    let want = vec![
        row(&[("k1", "v1x")], replay(&agg, &[1.0, 5.0])),
        row(&[("k1", "v1y")], replay(&agg, &[1.0])),
        row(
            &[("k1", "v1x"), ("k2", "v2x")],
            replay(&agg, &[1.0, 5.0, 3.0, 3.0]),
        ),
    ];
    assert_same_rows(&view.collected_rows(), &want);
}

// ============================================================================
// Sum and Mean Views
// ============================================================================

#[test]
fn test_sum_view_rows() {
    let view = subscribed_view(&["k1", "k2"], Aggregation::Sum);

    let records: &[(f64, &[(&str, &str)])] = &[
        (1.0, &[("k1", "v1")]),
        (5.0, &[("k1", "v1"), ("k3", "v3")]),
        (1.0, &[("k1", "v1 other")]),
        (5.0, &[("k2", "v2")]),
        (5.0, &[("k1", "v1"), ("k2", "v2")]),
    ];
    for (value, tags) in records {
        view.add_sample(&tag_set(tags), *value).unwrap();
    }

    let want = vec![
        row(&[("k1", "v1")], replay(&Aggregation::Sum, &[6.0])),
        row(&[("k1", "v1 other")], replay(&Aggregation::Sum, &[1.0])),
        row(&[("k2", "v2")], replay(&Aggregation::Sum, &[5.0])),
        row(
            &[("k1", "v1"), ("k2", "v2")],
            replay(&Aggregation::Sum, &[5.0]),
        ),
    ];
    assert_same_rows(&view.collected_rows(), &want);
}

#[test]
fn test_mean_view_rows() {
    let view = subscribed_view(&["k1", "k2"], Aggregation::Mean);

    let records: &[(f64, &[(&str, &str)])] = &[
        (1.0, &[("k1", "v1")]),
        (5.0, &[("k2", "v2")]),
        (-0.5, &[("k2", "v2")]),
    ];
    for (value, tags) in records {
        view.add_sample(&tag_set(tags), *value).unwrap();
    }

    let rows = view.collected_rows();
    assert_eq!(rows.len(), 2);

    let v2_row = rows
        .iter()
        .find(|r| r.tags == vec![Tag::new(TagKey::new("k2"), "v2")])
        .expect("row for k2=v2");
    match &v2_row.data {
        AggregationData::Mean(m) => {
            assert_eq!(m.count(), 2);
            assert_eq!(m.mean(), 2.25);
        }
        other => panic!("expected mean data, got {:?}", other),
    }
}

#[test]
fn test_empty_tag_keys_single_group() {
    let view = subscribed_view(&[], Aggregation::Count);

    view.add_sample(&tag_set(&[("k1", "v1")]), 1.0).unwrap();
    view.add_sample(&tag_set(&[("k2", "v2")]), 2.0).unwrap();
    view.add_sample(&tag_set(&[]), 3.0).unwrap();

    let rows = view.collected_rows();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].tags.is_empty());
    match &rows[0].data {
        AggregationData::Count(c) => assert_eq!(c.count(), 3),
        other => panic!("expected count data, got {:?}", other),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_clear_rows_round_trip() {
    let agg = Aggregation::distribution(vec![2.0]).unwrap();
    let view = subscribed_view(&["k1"], agg);

    let record = || {
        view.add_sample(&tag_set(&[("k1", "v1")]), 1.0).unwrap();
        view.add_sample(&tag_set(&[("k1", "v1")]), 5.0).unwrap();
        view.add_sample(&tag_set(&[("k1", "v2")]), 3.0).unwrap();
    };

    record();
    let before = view.collected_rows();

    view.clear_rows();
    assert!(view.collected_rows().is_empty());

    record();
    assert_same_rows(&view.collected_rows(), &before);
}

#[test]
fn test_canonicalize_through_registry() {
    let registry = ViewRegistry::new();
    let measure = Measure::new("canonical_measure", "desc desc", "1");

    registry
        .subscribe(View::new(
            measure,
            vec![TagKey::new("b"), TagKey::new("a"), TagKey::new("c")],
            Aggregation::Mean,
        ))
        .unwrap();

    let view = registry.find("canonical_measure").expect("registered");
    assert_eq!(view.name(), "canonical_measure");
    assert_eq!(view.description(), "desc desc");

    let names: Vec<_> = view.tag_keys().iter().map(|k| k.name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

// ============================================================================
// Registry Dispatch
// ============================================================================

#[test]
fn test_registry_dispatches_to_all_views_of_measure() {
    let registry = ViewRegistry::new();
    let measure = Measure::new("latency_ms", "operation latency", "ms");

    registry
        .subscribe(
            View::new(measure.clone(), vec![TagKey::new("host")], Aggregation::Count)
                .with_name("latency_count"),
        )
        .unwrap();
    registry
        .subscribe(
            View::new(
                measure,
                vec![TagKey::new("host")],
                Aggregation::distribution(vec![10.0, 100.0]).unwrap(),
            )
            .with_name("latency_distribution"),
        )
        .unwrap();

    for value in [5.0, 50.0, 500.0] {
        registry.record("latency_ms", &tag_set(&[("host", "web-01")]), value);
    }

    let count_rows = registry.find("latency_count").unwrap().collected_rows();
    assert_eq!(count_rows.len(), 1);
    match &count_rows[0].data {
        AggregationData::Count(c) => assert_eq!(c.count(), 3),
        other => panic!("expected count data, got {:?}", other),
    }

    let dist_rows = registry
        .find("latency_distribution")
        .unwrap()
        .collected_rows();
    assert_eq!(dist_rows.len(), 1);
    match &dist_rows[0].data {
        AggregationData::Distribution(d) => {
            assert_eq!(d.count(), 3);
            assert_eq!(d.bucket_counts(), &[1, 1, 1]);
        }
        other => panic!("expected distribution data, got {:?}", other),
    }
}

#[test]
fn test_row_snapshots_serialize() {
    let view = subscribed_view(&["k1"], Aggregation::distribution(vec![2.0]).unwrap());
    view.add_sample(&tag_set(&[("k1", "v1")]), 1.0).unwrap();

    let rows = view.collected_rows();
    let encoded = serde_json::to_string(&rows).expect("rows serialize");
    let decoded: Vec<Row> = serde_json::from_str(&encoded).expect("rows deserialize");
    assert_same_rows(&decoded, &rows);
}
