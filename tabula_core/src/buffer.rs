//! Sample storage shared between the control thread and the audio thread.
//!
//! Design goals:
//! - Readers (oscillators, followers) and the recorder touch samples without locks.
//! - Replacing a buffer is a pointer swap; a reader never sees a half-built buffer.
//! - A buffer is never freed on the audio thread.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::atomic::AtomicCell;
use parking_lot::Mutex;
use spin::RwLock;

/// Fixed-length run of samples.
///
/// Each sample is an `AtomicCell<f32>`, which is lock-free for 32-bit values,
/// so the recorder can write while any number of readers load concurrently.
pub struct SampleBuffer {
    samples: Box<[AtomicCell<f32>]>,
}

impl SampleBuffer {
    /// A buffer of `len` zeros.
    pub fn silent(len: usize) -> Self {
        Self {
            samples: (0..len).map(|_| AtomicCell::new(0.0)).collect(),
        }
    }

    pub fn from_vec(samples: Vec<f32>) -> Self {
        Self {
            samples: samples.into_iter().map(AtomicCell::new).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`. Panics if out of range, like slice indexing.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.samples[index].load()
    }

    #[inline]
    pub fn try_get(&self, index: usize) -> Option<f32> {
        self.samples.get(index).map(AtomicCell::load)
    }

    /// Overwrite the sample at `index`. Panics if out of range.
    #[inline]
    pub fn set(&self, index: usize, value: f32) {
        self.samples[index].store(value);
    }

    /// Linear interpolation at a fractional position, wrapping around the end
    /// so the table reads as one cycle of a periodic signal.
    #[inline]
    pub fn lerp(&self, position: f64) -> f32 {
        let len = self.samples.len();
        if len == 0 {
            return 0.0;
        }
        let wrapped = position.rem_euclid(len as f64);
        let index = wrapped as usize % len;
        let frac = (wrapped - wrapped.floor()) as f32;

        let a = self.samples[index].load();
        let b = self.samples[(index + 1) % len].load();
        a + frac * (b - a)
    }

    pub fn fill(&self, value: f32) {
        for sample in self.samples.iter() {
            sample.store(value);
        }
    }

    /// Copy out the current contents.
    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.iter().map(AtomicCell::load).collect()
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .map(|s| s.load().abs())
            .fold(0.0, f32::max)
    }
}

impl fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleBuffer").field("len", &self.len()).finish()
    }
}

/// Hot-swappable handle to one channel's current buffer.
///
/// The current buffer sits behind a `spin::RwLock<Arc<_>>`. The audio thread
/// only ever uses [`BufferSlot::try_load`], which never spins: it fails just
/// for the few instructions a [`publish`](BufferSlot::publish) holds the write
/// lock. Replaced buffers move to a retire list owned by the control side and
/// are dropped there once no reader still holds a clone, so the last reference
/// is never released on the audio thread.
pub struct BufferSlot {
    current: RwLock<Arc<SampleBuffer>>,
    retired: Mutex<Vec<Arc<SampleBuffer>>>,
    generation: AtomicU64,
}

impl BufferSlot {
    pub fn new(buffer: SampleBuffer) -> Self {
        Self {
            current: RwLock::new(Arc::new(buffer)),
            retired: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Realtime-safe snapshot of the current buffer.
    ///
    /// Returns `None` only while a swap is in progress. Performs no allocation:
    /// cloning an `Arc` is a reference count increment.
    #[inline]
    pub fn try_load(&self) -> Option<Arc<SampleBuffer>> {
        self.current.try_read().map(|guard| Arc::clone(&guard))
    }

    /// Snapshot of the current buffer for control-side callers. May spin
    /// briefly if a swap is in progress.
    pub fn load(&self) -> Arc<SampleBuffer> {
        Arc::clone(&self.current.read())
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buffers published since creation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the current buffer. Call from the control side only.
    ///
    /// The new buffer must be fully built before this call; readers observe
    /// either the old buffer or the new one, never anything in between.
    pub fn publish(&self, buffer: SampleBuffer) {
        let fresh = Arc::new(buffer);
        let old = {
            let mut guard = self.current.write();
            std::mem::replace(&mut *guard, fresh)
        };
        self.generation.fetch_add(1, Ordering::AcqRel);

        let mut retired = self.retired.lock();
        retired.push(old);
        retired.retain(|buffer| Arc::strong_count(buffer) > 1);
    }

    /// Drop retired buffers that no reader holds anymore. Returns how many are
    /// still pinned by readers.
    pub fn reclaim(&self) -> usize {
        let mut retired = self.retired.lock();
        retired.retain(|buffer| Arc::strong_count(buffer) > 1);
        retired.len()
    }
}

impl fmt::Debug for BufferSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferSlot")
            .field("len", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}
