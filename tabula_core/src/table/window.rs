use std::f64::consts::TAU;

use super::{DEFAULT_TABLE_SIZE, Table, TableStorage, validate_size};
use crate::error::Result;

/// Hann window. The contents are a pure function of the size.
pub struct WindowTable {
    storage: TableStorage,
}

impl WindowTable {
    pub fn new(size: usize) -> Result<Self> {
        let size = validate_size(size)?;
        Ok(Self {
            storage: TableStorage::mono(hann(size)),
        })
    }
}

impl Default for WindowTable {
    fn default() -> Self {
        Self {
            storage: TableStorage::mono(hann(DEFAULT_TABLE_SIZE)),
        }
    }
}

impl Table for WindowTable {
    fn storage(&self) -> &TableStorage {
        &self.storage
    }

    fn set_size(&self, size: usize) -> Result<()> {
        let size = validate_size(size)?;
        self.storage.publish_all(hann(size));
        Ok(())
    }
}

/// Symmetric Hann window: zero at both ends, peaking at the centre.
/// A one-sample window is the single value 1.0.
pub fn hann(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    let span = (size - 1) as f64;
    (0..size)
        .map(|i| (0.5 - 0.5 * (TAU * i as f64 / span).cos()) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_point_window() {
        let table = WindowTable::new(8).unwrap();
        let w = table.to_vec(0).unwrap();

        assert!(w[0].abs() < 1e-6);
        assert!(w[7].abs() < 1e-6);
        assert!((w[3] - w[4]).abs() < 1e-6);

        let max = w.iter().cloned().fold(f32::MIN, f32::max);
        assert!((w[3] - max).abs() < 1e-6);
        // the true peak falls between samples 3 and 4
        assert!(max > 0.9 && max <= 1.0);
    }

    #[test]
    fn test_odd_window_peaks_at_one() {
        let w = hann(9);
        assert!((w[4] - 1.0).abs() < 1e-6);
        for i in 0..9 {
            assert!((w[i] - w[8 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_single_sample_window() {
        let table = WindowTable::new(1).unwrap();
        assert_eq!(table.to_vec(0).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_resize_redraws() {
        let table = WindowTable::new(8).unwrap();
        table.set_size(17).unwrap();
        let w = table.to_vec(0).unwrap();
        assert_eq!(w.len(), 17);
        assert!((w[8] - 1.0).abs() < 1e-6);
        assert!(w[16].abs() < 1e-6);
        assert!(table.set_size(0).is_err());
    }
}
