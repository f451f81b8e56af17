//! Lock-conscious realtime callback slot.
//!
//! Stands in for the audio engine's per-block contract: once per block it
//! hands every attached processor the block's sample rate and length.
//!
//! Design goals:
//! - Avoid OS mutex/syscall in the hot audio callback path.
//! - Allow attaching and detaching processors from another thread.
//! - Never allocate inside the audio thread.
//! - If the processor list is busy (locked), output silence to avoid glitches.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;
use tabula_core::EngineConfig;

/// Trait every per-block processor must implement.
///
/// NOTE: `process` runs on the audio thread and must not perform blocking operations.
/// Implementations should not allocate inside `process`.
pub trait AudioCallback: Send + 'static {
    /// Handle one block.
    ///
    /// - `output`: interleaved f32 buffer (length == frames * channels). Sinks may
    ///   leave it untouched.
    /// - `sample_rate`: sample rate in Hz.
    /// - `channels`: number of output channels.
    /// - `frames`: number of frames in this block.
    fn process(&mut self, output: &mut [f32], sample_rate: f32, channels: usize, frames: usize);
}

/// Holds the attached processors and provides a realtime-safe `process_realtime` entrypoint.
///
/// Internally it holds `Arc<spin::Mutex<Vec<Box<dyn AudioCallback>>>>`. The audio thread
/// only ever calls `try_lock`; the control side takes the lock briefly to attach or
/// detach. The vector is given spare capacity up front so attaching does not reallocate
/// in the common case.
pub struct CallbackSlot {
    processors: Arc<Mutex<Vec<Box<dyn AudioCallback>>>>,

    /// Sample clock (frames processed). Atomic so it can be read from other threads.
    sample_clock: Arc<AtomicU64>,

    sample_rate: f32,
    channels: usize,
}

impl CallbackSlot {
    pub fn new(engine: &EngineConfig, channels: usize, capacity: usize) -> Self {
        Self {
            processors: Arc::new(Mutex::new(Vec::with_capacity(capacity))),
            sample_clock: Arc::new(AtomicU64::new(0)),
            sample_rate: engine.sample_rate as f32,
            channels: channels.max(1),
        }
    }

    /// Attach a processor; it runs from the next block on. Returns its index.
    pub fn attach(&self, processor: Box<dyn AudioCallback>) -> usize {
        let mut guard = self.processors.lock();
        guard.push(processor);
        guard.len() - 1
    }

    /// Detach every processor, handing them back so they drop on the caller's thread.
    pub fn detach_all(&self) -> Vec<Box<dyn AudioCallback>> {
        let mut guard = self.processors.lock();
        let capacity = guard.capacity();
        std::mem::replace(&mut *guard, Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.processors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Realtime-safe process entry called from the audio I/O callback.
    ///
    /// - `output` is an interleaved f32 buffer (frames * channels long). It is
    ///   zeroed first; processors that produce sound add or write into it.
    /// - Returns `true` if the processors ran; `false` if we fell back to silence.
    ///
    /// **Important**: This method performs no heap allocation.
    pub fn process_realtime(&self, output: &mut [f32]) -> bool {
        let frames = match output.len() / self.channels {
            0 => return false,
            n => n,
        };

        self.sample_clock.fetch_add(frames as u64, Ordering::Relaxed);
        output.fill(0.0);

        if let Some(mut guard) = self.processors.try_lock() {
            for processor in guard.iter_mut() {
                processor.process(output, self.sample_rate, self.channels, frames);
            }
            true
        } else {
            false
        }
    }

    /// Get current playback time in seconds (frames / sample_rate).
    pub fn playback_time(&self) -> f32 {
        let frames = self.sample_clock.load(Ordering::Relaxed);
        (frames as f32) / self.sample_rate
    }

    /// Get raw frame count processed so far.
    pub fn frame_count(&self) -> u64 {
        self.sample_clock.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counter(Arc<AtomicUsize>);

    impl AudioCallback for Counter {
        fn process(&mut self, output: &mut [f32], _sample_rate: f32, _channels: usize, frames: usize) {
            self.0.fetch_add(frames, Ordering::Relaxed);
            output.fill(1.0);
        }
    }

    #[test]
    fn test_runs_attached_processors() {
        let engine = EngineConfig::new(48000.0, 64).unwrap();
        let slot = CallbackSlot::new(&engine, 2, 4);
        let seen = Arc::new(AtomicUsize::new(0));
        assert_eq!(slot.attach(Box::new(Counter(Arc::clone(&seen)))), 0);

        let mut out = vec![0.0; 128];
        assert!(slot.process_realtime(&mut out));
        assert!(slot.process_realtime(&mut out));
        assert_eq!(seen.load(Ordering::Relaxed), 128);
        assert_eq!(slot.frame_count(), 128);
        assert!(out.iter().all(|&s| s == 1.0));
        assert!((slot.playback_time() - 128.0 / 48000.0).abs() < 1e-6);
    }

    #[test]
    fn test_busy_slot_outputs_silence() {
        let engine = EngineConfig::default();
        let slot = CallbackSlot::new(&engine, 1, 1);
        slot.attach(Box::new(Counter(Arc::new(AtomicUsize::new(0)))));

        let handle = Arc::clone(&slot.processors);
        let _held = handle.lock();
        let mut out = vec![0.5; 16];
        assert!(!slot.process_realtime(&mut out));
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_detach_all() {
        let slot = CallbackSlot::new(&EngineConfig::default(), 1, 2);
        slot.attach(Box::new(Counter(Arc::new(AtomicUsize::new(0)))));
        assert_eq!(slot.detach_all().len(), 1);
        assert!(slot.is_empty());
        assert!(!slot.process_realtime(&mut []));
    }
}
