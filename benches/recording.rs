use criterion::{black_box, criterion_group, criterion_main, Criterion};

use statsview::aggregation::Aggregation;
use statsview::types::{Measure, TagKey, TagSet};
use statsview::view::{View, ViewRegistry};

fn recording_registry() -> ViewRegistry {
    let registry = ViewRegistry::new();
    registry
        .subscribe(View::new(
            Measure::new("latency_ms", "operation latency", "ms"),
            vec![TagKey::new("host"), TagKey::new("method")],
            Aggregation::distribution(vec![1.0, 5.0, 25.0, 100.0, 500.0]).unwrap(),
        ))
        .expect("subscribe");
    registry
}

fn bench_record(c: &mut Criterion) {
    let registry = recording_registry();
    let tags = TagSet::from_pairs([("host", "web-01"), ("method", "GET")]);

    c.bench_function("record_existing_group", |b| {
        b.iter(|| registry.record("latency_ms", black_box(&tags), black_box(42.0)))
    });
}

fn bench_record_group_fanout(c: &mut Criterion) {
    let registry = recording_registry();
    let tag_sets: Vec<TagSet> = (0..64)
        .map(|i| {
            TagSet::from_pairs([
                ("host", format!("web-{:02}", i)),
                ("method", "GET".to_string()),
            ])
        })
        .collect();

    let mut i = 0usize;
    c.bench_function("record_64_groups", |b| {
        b.iter(|| {
            registry.record("latency_ms", black_box(&tag_sets[i % 64]), black_box(7.0));
            i += 1;
        })
    });
}

fn bench_collect(c: &mut Criterion) {
    let registry = recording_registry();
    for i in 0..100 {
        let tags = TagSet::from_pairs([
            ("host", format!("web-{:03}", i)),
            ("method", "GET".to_string()),
        ]);
        registry.record("latency_ms", &tags, i as f64);
    }
    let view = registry.find("latency_ms").expect("registered");

    c.bench_function("collect_100_groups", |b| {
        b.iter(|| black_box(view.collected_rows()))
    });
}

criterion_group!(benches, bench_record, bench_record_group_fanout, bench_collect);
criterion_main!(benches);
