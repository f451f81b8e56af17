/// Anything that produces interleaved blocks for the recorder to capture or
/// the fader to blend: table oscillators, other recorders' tables, DC levels.
pub trait AudioSource: Send {
    /// Write `frame_count` interleaved frames of `channels` samples.
    ///
    /// `output.len()` is `frame_count * channels`. Called on the audio thread;
    /// must not block or allocate.
    fn fill_buffer(&mut self, output: &mut [f32], sample_rate: f32, channels: usize, frame_count: usize);

    /// False once the source has nothing more to say.
    fn is_active(&self) -> bool;

    /// Return to the state right after construction.
    fn reset(&mut self);
}

/// A fixed level on every channel. Stands in for a line input when checking
/// gain shapes, since any fade applied to it shows up verbatim in the table.
pub struct ConstantSource {
    value: f32,
}

impl ConstantSource {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl AudioSource for ConstantSource {
    fn fill_buffer(&mut self, output: &mut [f32], _sample_rate: f32, _channels: usize, _frame_count: usize) {
        output.fill(self.value);
    }

    fn is_active(&self) -> bool {
        true
    }

    fn reset(&mut self) {}
}
