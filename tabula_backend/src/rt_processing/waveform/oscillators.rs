use std::sync::Arc;

use tabula_core::{SampleBuffer, Table};

use super::tables::{fast_lookup, interpolated_lookup, normalize_phase, phase_increment};
use crate::rt_processing::source::AudioSource;

/// Oscillator that reads one pass of a table per cycle.
///
/// Output channel `c` reads table channel `c % table_channels`. Buffers are
/// re-fetched from the table every block, so resizes and replacements are
/// picked up at block boundaries.
pub struct TableOscillator {
    table: Arc<dyn Table>,
    buffers: Vec<Arc<SampleBuffer>>,
    frequency: f32,
    amplitude: f32,
    phase: f32,
    active: bool,
    use_interpolation: bool,
}

impl TableOscillator {
    pub fn new(table: Arc<dyn Table>, frequency: f32) -> Self {
        let buffers = (0..table.channel_count()).filter_map(|c| table.buffer(c)).collect();
        Self {
            table,
            buffers,
            frequency,
            amplitude: 1.0,
            phase: 0.0,
            active: true,
            use_interpolation: true,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self
    }

    /// Enable or disable interpolation (trade quality for performance)
    pub fn with_interpolation(mut self, use_interpolation: bool) -> Self {
        self.use_interpolation = use_interpolation;
        self
    }

    /// Set starting phase (0.0 to 1.0)
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = normalize_phase(phase);
        self
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn current_phase(&self) -> f32 {
        self.phase
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    fn refresh_buffers(&mut self) {
        for (channel, cached) in self.buffers.iter_mut().enumerate() {
            let Some(slot) = self.table.storage().slot(channel) else {
                continue;
            };
            if let Some(current) = slot.try_load() {
                if !Arc::ptr_eq(&current, cached) {
                    *cached = current;
                }
            }
        }
    }
}

impl AudioSource for TableOscillator {
    fn fill_buffer(&mut self, output: &mut [f32], sample_rate: f32, channels: usize, frame_count: usize) {
        if !self.active || self.buffers.is_empty() {
            output.fill(0.0);
            return;
        }
        self.refresh_buffers();

        let phase_inc = phase_increment(self.frequency, sample_rate);
        let mut current_phase = self.phase;

        for frame_idx in 0..frame_count {
            let start = frame_idx * channels;
            for (ch, out) in output[start..start + channels].iter_mut().enumerate() {
                let table = &self.buffers[ch % self.buffers.len()];
                let sample = if self.use_interpolation {
                    interpolated_lookup(table, current_phase)
                } else {
                    fast_lookup(table, current_phase)
                };
                *out = sample * self.amplitude;
            }
            current_phase = normalize_phase(current_phase + phase_inc);
        }

        self.phase = current_phase;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{BreakpointTable, HarmonicTable};

    #[test]
    fn test_reads_ramp_at_table_rate() {
        // 10-sample ramp read at 100 Hz with a 1 kHz clock: one table step per sample
        let ramp = Arc::new(BreakpointTable::new([(0, 0.0), (9, 0.9)], 10).unwrap());
        let mut osc = TableOscillator::new(ramp, 100.0);

        let mut out = vec![0.0; 10];
        osc.fill_buffer(&mut out, 1000.0, 1, 10);
        for (i, &s) in out.iter().enumerate() {
            assert!((s - i as f32 * 0.1).abs() < 1e-5, "frame {i}: {s}");
        }
        assert!(osc.current_phase() < 1e-4 || osc.current_phase() > 0.9999);
    }

    #[test]
    fn test_follows_resize() {
        let sine = Arc::new(HarmonicTable::new(vec![1.0], 64).unwrap());
        let mut osc = TableOscillator::new(Arc::clone(&sine) as Arc<dyn Table>, 250.0);
        sine.set_size(4096).unwrap();

        let mut out = vec![0.0; 4];
        osc.fill_buffer(&mut out, 1000.0, 1, 4);
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 1.0).abs() < 1e-6);
        assert!((out[3] + 1.0).abs() < 1e-6);
        assert_eq!(osc.buffers[0].len(), 4096);
    }

    #[test]
    fn test_fast_lookup_with_phase_and_amplitude() {
        let sine = Arc::new(HarmonicTable::new(vec![1.0], 1024).unwrap());
        let mut osc = TableOscillator::new(sine, 500.0)
            .with_interpolation(false)
            .with_phase(1.25)
            .with_amplitude(0.5);
        osc.set_frequency(250.0);
        assert_eq!(osc.frequency(), 250.0);

        let mut out = vec![0.0; 4];
        osc.fill_buffer(&mut out, 1000.0, 1, 4);
        assert!((out[0] - 0.5).abs() < 1e-6);
        assert!(out[1].abs() < 1e-6);
        assert!((out[2] + 0.5).abs() < 1e-6);
        assert!(out[3].abs() < 1e-6);
    }

    #[test]
    fn test_stopped_is_silent() {
        let sine = Arc::new(HarmonicTable::default());
        let mut osc = TableOscillator::new(sine, 440.0);
        osc.stop();
        let mut out = vec![1.0; 8];
        osc.fill_buffer(&mut out, 48000.0, 2, 4);
        assert!(out.iter().all(|&s| s == 0.0));
        assert!(!osc.is_active());

        osc.start();
        osc.fill_buffer(&mut out, 48000.0, 2, 4);
        assert!(out[2] > 0.0);
        assert_eq!(out[2], out[3]);

        osc.reset();
        assert_eq!(osc.current_phase(), 0.0);
    }
}
