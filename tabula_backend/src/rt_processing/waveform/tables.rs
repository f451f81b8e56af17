use tabula_core::SampleBuffer;

/// Linear-interpolated lookup into one cycle stored in `table`.
/// Phase should be normalized to [0.0, 1.0)
#[inline]
pub fn interpolated_lookup(table: &SampleBuffer, phase: f32) -> f32 {
    table.lerp(phase as f64 * table.len() as f64)
}

/// Fast, non-interpolated lookup (for when performance is critical)
#[inline]
pub fn fast_lookup(table: &SampleBuffer, phase: f32) -> f32 {
    let len = table.len();
    if len == 0 {
        return 0.0;
    }
    let index = (phase * len as f32) as usize % len;
    table.get(index)
}

/// Normalize phase to [0.0, 1.0) range to prevent accumulation errors
#[inline]
pub fn normalize_phase(phase: f32) -> f32 {
    phase - phase.floor()
}

/// Phase increment calculation helper
#[inline]
pub fn phase_increment(frequency: f32, sample_rate: f32) -> f32 {
    frequency / sample_rate
}
