use std::f64::consts::TAU;

use parking_lot::Mutex;

use super::{DEFAULT_TABLE_SIZE, Table, TableStorage, validate_size};
use crate::error::{Result, TableError};

/// A peak this small relative to the summed partial strengths is numerical
/// residue (e.g. `sin(pi)`) rather than signal.
const SILENCE_RATIO: f64 = 1e-9;

/// One cycle of a waveform built from weighted harmonic partials.
///
/// `weights[k]` is the relative strength of partial `k + 1`. The rendered
/// cycle is peak-normalized, so its largest absolute sample is exactly 1.0
/// whatever the weights are, or the table is silent.
pub struct HarmonicTable {
    weights: Mutex<Vec<f32>>,
    storage: TableStorage,
}

impl HarmonicTable {
    pub fn new(weights: Vec<f32>, size: usize) -> Result<Self> {
        let size = validate_size(size)?;
        validate_weights(&weights)?;
        let samples = render(&weights, size);
        log::debug!("harmonic table: {} partials over {} samples", weights.len(), size);

        Ok(Self {
            weights: Mutex::new(weights),
            storage: TableStorage::mono(samples),
        })
    }

    /// Redraw the cycle from a new set of partial strengths.
    pub fn replace(&self, weights: Vec<f32>) -> Result<()> {
        validate_weights(&weights)?;
        let mut current = self.weights.lock();
        self.storage.publish_all(render(&weights, self.storage.size()));
        *current = weights;
        Ok(())
    }

    /// Current partial strengths.
    pub fn weights(&self) -> Vec<f32> {
        self.weights.lock().clone()
    }
}

impl Default for HarmonicTable {
    /// A pure sine over 8192 samples.
    fn default() -> Self {
        let weights = vec![1.0];
        let samples = render(&weights, DEFAULT_TABLE_SIZE);
        Self {
            weights: Mutex::new(weights),
            storage: TableStorage::mono(samples),
        }
    }
}

impl Table for HarmonicTable {
    fn storage(&self) -> &TableStorage {
        &self.storage
    }

    fn set_size(&self, size: usize) -> Result<()> {
        let size = validate_size(size)?;
        let weights = self.weights.lock();
        self.storage.publish_all(render(&weights, size));
        log::debug!("harmonic table resized to {} samples", size);
        Ok(())
    }
}

fn validate_weights(weights: &[f32]) -> Result<()> {
    match weights.iter().position(|w| !w.is_finite()) {
        Some(index) => Err(TableError::NonFiniteWeight { index }),
        None => Ok(()),
    }
}

/// Sum the partials over `size` samples and scale the result to unit peak.
pub fn render(weights: &[f32], size: usize) -> Vec<f32> {
    let mut acc = vec![0.0f64; size];

    for (k, &weight) in weights.iter().enumerate() {
        if weight == 0.0 {
            continue;
        }
        let harmonic = k + 1;
        for (i, sample) in acc.iter_mut().enumerate() {
            // Reduce the phase index before scaling to keep high partials accurate.
            let step = (harmonic * i) % size;
            *sample += weight as f64 * (TAU * step as f64 / size as f64).sin();
        }
    }

    let total: f64 = weights.iter().map(|w| w.abs() as f64).sum();
    let peak = acc.iter().fold(0.0f64, |m, s| m.max(s.abs()));
    if peak <= total * SILENCE_RATIO {
        return vec![0.0; size];
    }

    let scale = 1.0 / peak;
    acc.into_iter().map(|s| (s * scale) as f32).collect()
}
