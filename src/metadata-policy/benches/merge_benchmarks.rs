//! Metadata policy benchmarks
//!
//! Measures chain merging and metadata enforcement for chains of growing
//! length and policies over many parameters.

use cretoai_metadata_policy::{ChainLink, ParameterTypes, PolicyMerger, ValueType};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Map, Value};

fn create_chain(depth: usize, parameters: usize) -> Vec<ChainLink> {
    (0..depth)
        .map(|level| {
            let mut link = ChainLink::new().with_issuer(format!("https://level-{}.example", level));
            for p in 0..parameters {
                let allowed: Vec<String> =
                    (level..level + 32).map(|v| format!("alg-{}", v)).collect();
                let required = json!([format!("alg-{}", depth)]);
                link = link
                    .with_operator(format!("param_{}", p), "subset_of", json!(allowed))
                    .with_operator(format!("param_{}", p), "superset_of", required);
            }
            link
        })
        .collect()
}

fn create_types(parameters: usize) -> ParameterTypes {
    (0..parameters).fold(ParameterTypes::new(), |types, p| {
        types.with_type(format!("param_{}", p), ValueType::StringArray)
    })
}

fn create_metadata(parameters: usize) -> Map<String, Value> {
    (0..parameters)
        .map(|p| (format!("param_{}", p), json!(["alg-8", "alg-12", "unknown"])))
        .collect()
}

fn bench_chain_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_merge");

    for depth in [2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::new("depth", depth), depth, |b, &depth| {
            let chain = create_chain(depth, 20);
            let merger = PolicyMerger::new().with_types(create_types(20));

            b.iter(|| black_box(merger.merge(black_box(&chain)).unwrap()));
        });
    }

    group.finish();
}

fn bench_metadata_enforcement(c: &mut Criterion) {
    let mut group = c.benchmark_group("metadata_enforcement");

    for parameters in [10, 100].iter() {
        let chain = create_chain(3, *parameters);
        let policy = PolicyMerger::new()
            .with_types(create_types(*parameters))
            .merge(&chain)
            .unwrap();
        let metadata = create_metadata(*parameters);

        group.bench_with_input(BenchmarkId::new("apply", parameters), parameters, |b, _| {
            b.iter(|| black_box(policy.apply(black_box(&metadata)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("validate", parameters), parameters, |b, _| {
            b.iter(|| black_box(policy.validate(black_box(&metadata)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chain_merge, bench_metadata_enforcement);
criterion_main!(benches);
