//! Performance benchmarks for the capture pipeline.
//!
//! Measures the per-request work done around the hardware: PNG encoding of
//! raw frames, base64 transport encoding of templates and images, and a
//! full simulated capture through the device session.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench capture_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use scanbridge_core::codec;
use scanbridge_core::constants::TEMPLATE_SIZE;
use scanbridge_hardware::DeviceSession;
use scanbridge_hardware::imaging::encode_grayscale_png;
use scanbridge_hardware::mock::MockScanner;
use std::hint::black_box;

/// Frame geometries of common sensors (width, height).
const FRAME_SIZES: [(u32, u32); 3] = [(260, 300), (300, 400), (400, 500)];

fn synthetic_frame(width: u32, height: u32) -> Vec<u8> {
    (0..width * height).map(|i| (i % 251) as u8).collect()
}

/// Benchmark PNG encoding of raw grayscale frames.
fn bench_png_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encode");

    for (width, height) in FRAME_SIZES {
        let frame = synthetic_frame(width, height);
        group.throughput(Throughput::Bytes(frame.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &frame,
            |b, frame| {
                b.iter(|| {
                    let png = encode_grayscale_png(width, height, black_box(frame)).unwrap();
                    black_box(png);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark base64 encoding and decoding of a template.
fn bench_template_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_codec");
    group.throughput(Throughput::Bytes(TEMPLATE_SIZE as u64));

    let template: Vec<u8> = (0..TEMPLATE_SIZE).map(|i| (i * 7 % 251) as u8).collect();
    let encoded = codec::encode(&template);

    group.bench_function("encode_template", |b| {
        b.iter(|| black_box(codec::encode(black_box(&template))));
    });

    group.bench_function("decode_template", |b| {
        b.iter(|| black_box(codec::decode(black_box(&encoded)).unwrap()));
    });

    group.finish();
}

/// Benchmark base64 encoding of a PNG-encoded frame.
fn bench_image_transport(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_transport");

    let (width, height) = FRAME_SIZES[0];
    let png = encode_grayscale_png(width, height, &synthetic_frame(width, height)).unwrap();
    group.throughput(Throughput::Bytes(png.len() as u64));

    group.bench_function("encode_png_base64", |b| {
        b.iter(|| black_box(codec::encode(black_box(&png))));
    });

    group.finish();
}

/// Benchmark a complete capture through the session against the simulated scanner.
fn bench_session_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_capture");
    group.throughput(Throughput::Elements(1));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let (driver, _handle) = MockScanner::new();
    let session = DeviceSession::new(driver);
    runtime.block_on(session.ensure_initialized()).unwrap();

    group.bench_function("capture_simulated", |b| {
        b.iter(|| {
            let capture = runtime.block_on(session.capture_image(50, 10_000)).unwrap();
            black_box(capture);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_png_encode,
    bench_template_codec,
    bench_image_transport,
    bench_session_capture,
);

criterion_main!(benches);
