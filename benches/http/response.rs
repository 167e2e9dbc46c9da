use criterion::{Criterion, Throughput};
use std::hint::black_box;
use webapi::Response;
use webapi::compression::{Algorithm, Capabilities, Compression, Zlib};

fn sample_headers() -> String {
    (0..20)
        .map(|i| format!("X-Header-{i}: value-{i}\r\n"))
        .collect()
}

pub fn bench_parse_plain(c: &mut Criterion) {
    let body = vec![b'a'; 16 * 1024];
    let mut raw = format!(
        "HTTP/1.1 200 OK\r\n{}Content-Length: {}\r\n\r\n",
        sample_headers(),
        body.len()
    )
    .into_bytes();
    raw.extend_from_slice(&body);

    let mut group = c.benchmark_group("response_parse");
    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("plain_16k", |b| {
        b.iter(|| Response::parse(black_box(&raw), None).unwrap())
    });
    group.finish();
}

pub fn bench_parse_chunked(c: &mut Criterion) {
    let mut raw = format!(
        "HTTP/1.1 200 OK\r\n{}Transfer-Encoding: chunked\r\n\r\n",
        sample_headers()
    )
    .into_bytes();
    let chunk = [b'c'; 1000];
    for _ in 0..16 {
        raw.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        raw.extend_from_slice(&chunk);
        raw.extend_from_slice(b"\r\n");
    }
    raw.extend_from_slice(b"0\r\n\r\n");

    let mut group = c.benchmark_group("response_parse");
    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("chunked_16x1000", |b| {
        b.iter(|| Response::parse(black_box(&raw), None).unwrap())
    });
    group.finish();
}

pub fn bench_parse_gzip(c: &mut Criterion) {
    let text: String = (0..2000).map(|i| format!("line {i}\n")).collect();
    let packed = Zlib.compress(text.as_bytes(), Algorithm::Gzip);
    let mut raw = format!(
        "HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\nContent-Length: {}\r\n\r\n",
        packed.len()
    )
    .into_bytes();
    raw.extend_from_slice(&packed);
    let compression = Capabilities::detect().compression();

    let mut group = c.benchmark_group("response_parse");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("gzip", |b| {
        b.iter(|| Response::parse(black_box(&raw), compression).unwrap())
    });
    group.finish();
}
