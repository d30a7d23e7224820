use criterion::{black_box, BenchmarkId, Criterion};
use criterion::{criterion_group, criterion_main};

use cos_agent_provider::{
    Endpoint, MemoryFlags, MemoryRelation, MetricsEndpointSpec, ProviderConfig, ScrapeJobBuilder,
};

fn endpoints(count: usize) -> Vec<MetricsEndpointSpec> {
    (0..count)
        .map(|idx| MetricsEndpointSpec::new("/metrics", 9000 + idx as u16))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let builder = ScrapeJobBuilder::new("myapp");
    let mut group = c.benchmark_group("build");
    for &count in &[1_usize, 16, 256] {
        let specs = endpoints(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &specs, |b, specs| {
            b.iter(|| builder.build(Some(black_box(specs.as_slice()))).expect("build"));
        });
    }
    group.finish();
}

fn bench_publish(c: &mut Criterion) {
    let mut endpoint = Endpoint::new(&ProviderConfig::new("myapp"), MemoryFlags::new());
    for idx in 0..8 {
        endpoint.attach(MemoryRelation::new(format!("cos-agent:{idx:02}")));
    }
    let specs = endpoints(16);
    c.bench_function("publish_8_relations", |b| {
        b.iter(|| {
            endpoint
                .update_relation_data(Some(black_box(specs.as_slice())))
                .expect("publish")
        });
    });
}

criterion_group!(benches, bench_build, bench_publish);
criterion_main!(benches);
