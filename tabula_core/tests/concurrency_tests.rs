//! Readers racing control-side resizes must only ever see complete buffers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tabula_core::{HarmonicTable, Table, WindowTable};

#[test]
fn test_readers_never_see_partial_buffers() {
    let table = Arc::new(WindowTable::new(64).unwrap());
    let running = Arc::new(AtomicBool::new(true));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let table = Arc::clone(&table);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                let mut observed = 0usize;
                while running.load(Ordering::Relaxed) {
                    let Some(buffer) = table.storage().slot(0).unwrap().try_load() else {
                        continue;
                    };
                    let n = buffer.len();
                    assert!(n == 64 || n == 257, "unexpected length {n}");
                    // A complete Hann window is symmetric end to end.
                    assert!((buffer.get(0) - buffer.get(n - 1)).abs() < 1e-6);
                    assert!((buffer.get(1) - buffer.get(n - 2)).abs() < 1e-6);
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    for i in 0..500 {
        table.set_size(if i % 2 == 0 { 257 } else { 64 }).unwrap();
    }
    running.store(false, Ordering::Relaxed);

    for reader in readers {
        reader.join().unwrap();
    }

    // Once readers are gone every retired buffer can be released.
    assert_eq!(table.storage().reclaim(), 0);
    assert_eq!(table.size(), 64);
}

#[test]
fn test_concurrent_replace_keeps_weights_and_buffer_in_step() {
    let table = Arc::new(HarmonicTable::new(vec![1.0], 256).unwrap());

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                for i in 0..50 {
                    let mut weights = vec![0.0; 1 + (t + i) % 4];
                    *weights.last_mut().unwrap() = 1.0;
                    table.replace(weights).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let weights = table.weights();
    let fresh = HarmonicTable::new(weights, 256).unwrap();
    assert_eq!(table.to_vec(0).unwrap(), fresh.to_vec(0).unwrap());
}
