use criterion::{Criterion, Throughput};
use std::hint::black_box;
use webapi::{Client, Options};

pub fn bench_build_post(c: &mut Criterion) {
    let options = Options::default()
        .with_content_type("application/json")
        .with_header("X-Device", "sensor-01");
    let client = Client::new("http://api.example.com/v1/", options).unwrap();
    let body = br#"{"temperature":21.5,"humidity":40}"#;

    let mut group = c.benchmark_group("request_build");
    group.throughput(Throughput::Elements(1));
    group.bench_function("post_json", |b| {
        b.iter(|| client.build_post(black_box("/readings"), black_box(body)))
    });
    group.finish();
}
