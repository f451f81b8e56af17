use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tabula_core::table::{breakpoint, harmonic, window};

fn bench_harmonic(c: &mut Criterion) {
    let mut group = c.benchmark_group("harmonic_render");
    let weights: Vec<f32> = (1..=16).map(|k| 1.0 / k as f32).collect();
    for size in [1024usize, 8192] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| harmonic::render(black_box(&weights), size))
        });
    }
    group.finish();
}

fn bench_window_and_breakpoints(c: &mut Criterion) {
    c.bench_function("hann_8192", |b| b.iter(|| window::hann(black_box(8192))));

    let points: [(usize, f32); 4] = [(0, 0.0), (100, 1.0), (4000, 0.3), (8191, 0.0)];
    c.bench_function("breakpoint_render_8192", |b| {
        b.iter(|| breakpoint::render(black_box(&points), 8192))
    });
}

criterion_group!(benches, bench_harmonic, bench_window_and_breakpoints);
criterion_main!(benches);
