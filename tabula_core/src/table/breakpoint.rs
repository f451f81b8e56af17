use parking_lot::Mutex;

use super::{DEFAULT_TABLE_SIZE, Table, TableStorage, validate_size};
use crate::error::{Result, TableError};

/// A `(location, value)` anchor. Locations are sample indices.
pub type Breakpoint = (usize, f32);

/// Piecewise-linear envelope drawn through breakpoints.
///
/// Samples before the first point hold the first value; samples after the
/// last point are zero. Locations are absolute sample indices and are not
/// rescaled when the table is resized.
pub struct BreakpointTable {
    points: Mutex<Vec<Breakpoint>>,
    storage: TableStorage,
}

impl BreakpointTable {
    pub fn new(points: impl IntoIterator<Item = Breakpoint>, size: usize) -> Result<Self> {
        let size = validate_size(size)?;
        let points: Vec<Breakpoint> = points.into_iter().collect();
        validate_points(&points, size)?;
        let samples = render(&points, size);

        Ok(Self {
            points: Mutex::new(points),
            storage: TableStorage::mono(samples),
        })
    }

    /// Draw a new envelope.
    pub fn replace(&self, points: impl IntoIterator<Item = Breakpoint>) -> Result<()> {
        let points: Vec<Breakpoint> = points.into_iter().collect();
        let mut current = self.points.lock();
        let size = self.storage.size();
        validate_points(&points, size)?;
        self.storage.publish_all(render(&points, size));
        *current = points;
        Ok(())
    }

    /// The stored breakpoints.
    pub fn points(&self) -> Vec<Breakpoint> {
        self.points.lock().clone()
    }
}

impl Default for BreakpointTable {
    /// A ramp from 0.0 to 1.0 across 8192 samples.
    fn default() -> Self {
        let points = vec![(0, 0.0), (DEFAULT_TABLE_SIZE - 1, 1.0)];
        let samples = render(&points, DEFAULT_TABLE_SIZE);
        Self {
            points: Mutex::new(points),
            storage: TableStorage::mono(samples),
        }
    }
}

impl Table for BreakpointTable {
    fn storage(&self) -> &TableStorage {
        &self.storage
    }

    /// Re-render the stored points at the new size. The points must still fit.
    fn set_size(&self, size: usize) -> Result<()> {
        let size = validate_size(size)?;
        let points = self.points.lock();
        validate_points(&points, size)?;
        self.storage.publish_all(render(&points, size));
        Ok(())
    }
}

fn validate_points(points: &[Breakpoint], size: usize) -> Result<()> {
    if points.is_empty() {
        return Err(TableError::EmptyBreakpoints);
    }
    for (index, &(location, value)) in points.iter().enumerate() {
        if !value.is_finite() {
            return Err(TableError::NonFiniteValue { index });
        }
        if location >= size {
            return Err(TableError::BreakpointOutOfRange { index, location, size });
        }
        if index > 0 && location <= points[index - 1].0 {
            return Err(TableError::BreakpointNotIncreasing { index });
        }
    }
    Ok(())
}

/// Rasterize validated points into `size` samples.
pub fn render(points: &[Breakpoint], size: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; size];
    let Some(&(first_location, first_value)) = points.first() else {
        return out;
    };

    out[..first_location].fill(first_value);

    for segment in points.windows(2) {
        let (start, from) = segment[0];
        let (end, to) = segment[1];
        let span = (end - start) as f64;
        let delta = (to - from) as f64;
        for (offset, sample) in out[start..=end].iter_mut().enumerate() {
            *sample = (from as f64 + delta * offset as f64 / span) as f32;
        }
    }

    // A lone point (or the last one) still lands exactly on its value.
    if let Some(&(location, value)) = points.last() {
        out[location] = value;
    }
    out
}
