use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wrapload::workload::{Buffer, wraparound_read};

const ACCESSES: u64 = 1_000_000;

fn bench_working_sets(c: &mut Criterion) {
    let mut group = c.benchmark_group("wraparound_read");
    group.throughput(Throughput::Elements(ACCESSES));

    // 16 KiB (L1), 1 MiB (L2), 16 MiB (L3), 256 MiB (DRAM)
    for elements in [4 * 1024, 256 * 1024, 4 * 1024 * 1024, 64 * 1024 * 1024] {
        let buffer = match Buffer::allocate(elements) {
            Ok(buffer) => buffer,
            Err(e) => {
                eprintln!("skipping {} elements: {}", elements, e);
                continue;
            }
        };

        group.bench_with_input(BenchmarkId::from_parameter(elements), &buffer, |b, buffer| {
            b.iter(|| wraparound_read(black_box(ACCESSES), buffer.as_slice()));
        });
    }

    group.finish();
}

fn bench_single_element(c: &mut Criterion) {
    c.bench_function("wraparound_read_single_element", |b| {
        let buffer = [0i32; 1];
        b.iter(|| wraparound_read(black_box(ACCESSES), &buffer));
    });
}

criterion_group!(benches, bench_working_sets, bench_single_element);
criterion_main!(benches);
