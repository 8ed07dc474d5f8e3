// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pulse_ingest::extract_rows;
use pulse_model::{Family, PeriodKey, Quarter, StateName, Year};
use serde_json::json;

fn bench_extract(c: &mut Criterion) {
    let key = PeriodKey::new(
        StateName::parse("uttar-pradesh").expect("state"),
        Year::parse("2023").expect("year"),
        Quarter::new(4).expect("quarter"),
    );
    let districts: Vec<_> = (0..75)
        .map(|i| {
            json!({"name": format!("district-{i}"), "metric": [{"type": "TOTAL", "count": i * 1000, "amount": i as f64 * 1.5e6}]})
        })
        .collect();
    let map_doc = json!({"data": {"hoverDataList": districts}});
    let pins: Vec<_> = (0..1000)
        .map(|i| json!([25.0 + i as f64 / 1000.0, 80.0, i, format!("{}", 200_000 + i)]))
        .collect();
    let grid_doc = json!({"data": {"columns": ["lat", "lng", "metric", "label"], "data": pins}});

    c.bench_function("extract_district_metrics_75", |b| {
        b.iter(|| extract_rows(Family::MapTransaction.rule(), black_box(&map_doc), &key))
    });
    c.bench_function("extract_column_zip_1000", |b| {
        b.iter(|| extract_rows(Family::MapInsurance.rule(), black_box(&grid_doc), &key))
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
