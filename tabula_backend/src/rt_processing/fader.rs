//! Click-free source replacement.
//!
//! [`InputFader`] wraps a source and, when asked to switch to a new one, runs a
//! linear crossfade from the old source to the new one over a fixed number of
//! samples. Both sources keep rendering during the fade, so the transition is
//! sample-accurate and adds no latency beyond the fade itself.
//!
//! Only one crossfade runs at a time. A switch requested while one is in
//! progress waits for it to finish and then fades from there.

use super::source::AudioSource;

struct PendingInput {
    source: Box<dyn AudioSource>,
    fade_samples: usize,
}

pub struct InputFader {
    current: Box<dyn AudioSource>,
    outgoing: Option<Box<dyn AudioSource>>,
    /// Source whose fade has completed, waiting to be collected.
    finished: Option<Box<dyn AudioSource>>,
    pending: Option<PendingInput>,
    fade_len: usize,
    fade_pos: usize,
    // Interleaved render space for the outgoing source.
    scratch: Vec<f32>,
}

impl InputFader {
    /// Wrap `source`. `max_samples` is the largest interleaved block
    /// (frames * channels) rendered without chunking.
    pub fn new(source: Box<dyn AudioSource>, max_samples: usize) -> Self {
        Self {
            current: source,
            outgoing: None,
            finished: None,
            pending: None,
            fade_len: 0,
            fade_pos: 0,
            scratch: vec![0.0; max_samples.max(1)],
        }
    }

    /// Crossfade to `source` over `fade_samples` samples.
    ///
    /// Starts right away when the fader is idle. While a crossfade is running,
    /// or its outgoing source has not been collected yet, the switch is queued
    /// and starts at the first block after that; a newer request replaces a
    /// queued one.
    ///
    /// Returns a source that is no longer needed: a queued request that was
    /// superseded, or the current one when the switch happens immediately with
    /// `fade_samples` of zero. The caller decides where it gets dropped.
    pub fn set_input(
        &mut self,
        source: Box<dyn AudioSource>,
        fade_samples: usize,
    ) -> Option<Box<dyn AudioSource>> {
        if self.outgoing.is_some() || self.finished.is_some() {
            let queued = PendingInput { source, fade_samples };
            return self.pending.replace(queued).map(|p| p.source);
        }
        self.begin(source, fade_samples)
    }

    fn begin(&mut self, source: Box<dyn AudioSource>, fade_samples: usize) -> Option<Box<dyn AudioSource>> {
        let previous = std::mem::replace(&mut self.current, source);
        if fade_samples == 0 {
            return Some(previous);
        }
        self.fade_len = fade_samples;
        self.fade_pos = 0;
        self.outgoing = Some(previous);
        None
    }

    fn start_pending(&mut self) {
        if self.outgoing.is_some() || self.finished.is_some() {
            return;
        }
        if let Some(next) = self.pending.take() {
            self.finished = self.begin(next.source, next.fade_samples);
        }
    }

    /// Take the source whose crossfade has completed, if any.
    pub fn take_retired(&mut self) -> Option<Box<dyn AudioSource>> {
        self.finished.take()
    }

    pub fn is_fading(&self) -> bool {
        self.outgoing.is_some()
    }

    /// True while a switch waits for the running crossfade.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Weight of the new source at the next sample, 1.0 when not fading.
    pub fn mix(&self) -> f32 {
        if self.outgoing.is_some() {
            self.fade_pos as f32 / self.fade_len as f32
        } else {
            1.0
        }
    }

    fn fill_chunk(&mut self, output: &mut [f32], sample_rate: f32, channels: usize, frames: usize) {
        self.current.fill_buffer(output, sample_rate, channels, frames);

        let Some(outgoing) = self.outgoing.as_mut() else {
            return;
        };
        // A frame wider than the scratch space leaves the old source silent.
        let rendered = match self.scratch.get_mut(..output.len()) {
            Some(old) => {
                outgoing.fill_buffer(old, sample_rate, channels, frames);
                true
            }
            None => false,
        };

        for frame in 0..frames {
            let t = (self.fade_pos as f32 / self.fade_len as f32).min(1.0);
            let start = frame * channels;
            for (offset, new) in output[start..start + channels].iter_mut().enumerate() {
                let prev = if rendered { self.scratch[start + offset] } else { 0.0 };
                *new = prev * (1.0 - t) + *new * t;
            }
            if self.fade_pos < self.fade_len {
                self.fade_pos += 1;
            }
        }

        if self.fade_pos >= self.fade_len {
            self.finished = self.outgoing.take();
        }
    }
}

impl AudioSource for InputFader {
    fn fill_buffer(&mut self, output: &mut [f32], sample_rate: f32, channels: usize, frame_count: usize) {
        self.start_pending();

        let channels = channels.max(1);
        let chunk_frames = (self.scratch.len() / channels).max(1);

        let mut done = 0;
        while done < frame_count {
            let frames = chunk_frames.min(frame_count - done);
            let span = &mut output[done * channels..(done + frames) * channels];
            self.fill_chunk(span, sample_rate, channels, frames);
            done += frames;
        }
    }

    fn is_active(&self) -> bool {
        self.current.is_active()
    }

    fn reset(&mut self) {
        self.current.reset();
    }
}
