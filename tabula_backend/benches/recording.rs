use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tabula_backend::{AudioCallback, TableOscillator, TableRecorder};
use tabula_core::{EngineConfig, HarmonicTable, RecordableTable};

fn bench_recorder_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("recorder_block");
    for block in [64usize, 256, 1024] {
        let engine = EngineConfig::new(48000.0, block).unwrap();
        let sine = Arc::new(HarmonicTable::default());
        let table = Arc::new(RecordableTable::new(60.0, 2, &engine).unwrap());
        let (mut recorder, handle) =
            TableRecorder::new(Box::new(TableOscillator::new(sine, 440.0)), table, 0.01, &engine);
        handle.play();

        let mut output = vec![0.0; block * 2];
        group.bench_with_input(BenchmarkId::from_parameter(block), &block, |b, &block| {
            b.iter(|| {
                recorder.process(&mut output, 48000.0, 2, block);
                // start a new take once the table is full
                if !recorder.state().is_writing() {
                    handle.play();
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_recorder_block);
criterion_main!(benches);
