use criterion::{criterion_group, criterion_main};

mod http;

criterion_group!(
    benches,
    http::response::bench_parse_plain,
    http::response::bench_parse_chunked,
    http::response::bench_parse_gzip,
    http::request::bench_build_post
);
criterion_main!(benches);
