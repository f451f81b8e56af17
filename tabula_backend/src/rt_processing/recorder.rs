//! Live capture of a signal into a [`RecordableTable`].
//!
//! The recorder is split in two halves:
//! - [`TableRecorder`] lives on the audio thread and is driven once per block
//!   through [`AudioCallback::process`]. It never blocks, allocates or logs.
//! - [`RecorderHandle`] stays on the control side. `play`, `stop` and
//!   `set_input` are sent over bounded channels; the audio thread drains them
//!   at the next block boundary, transport commands in the order they were
//!   issued.
//!
//! Replaced input sources are sent back to the handle so they are dropped off
//! the audio thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::atomic::AtomicCell;
use crossbeam::channel::{self, Receiver, Sender};
use tabula_core::{EngineConfig, RecordableTable, SampleBuffer, Table};

use super::callback::AudioCallback;
use super::fader::InputFader;
use super::source::AudioSource;

/// Crossfade applied by [`RecorderHandle::set_input`] when the caller has no
/// preference, in seconds.
pub const DEFAULT_INPUT_FADE: f32 = 0.05;

const INPUT_QUEUE: usize = 8;
const TRANSPORT_QUEUE: usize = 32;
const EVENT_QUEUE: usize = 16;

/// Recorder lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    FadingIn,
    Recording,
    FadingOut,
    Done,
}

impl RecorderState {
    /// True while samples are being written.
    pub fn is_writing(self) -> bool {
        matches!(self, RecorderState::FadingIn | RecorderState::Recording | RecorderState::FadingOut)
    }
}

/// Notifications posted by the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A take ended after writing `frames` frames.
    Finished { frames: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Play,
    Stop,
}

struct InputChange {
    source: Box<dyn AudioSource>,
    fade_time: f32,
}

/// State visible to both halves.
struct Shared {
    state: AtomicCell<RecorderState>,
    cursor: AtomicUsize,
}

/// Audio-thread half. Writes the incoming signal into the table.
///
/// It is a sink: [`AudioCallback::process`] leaves the engine's output buffer
/// untouched, and there is no gain control besides the fades.
pub struct TableRecorder {
    fader: InputFader,
    table: Arc<RecordableTable>,
    fade_time: f32,
    shared: Arc<Shared>,
    transport_rx: Receiver<Transport>,
    input_rx: Receiver<InputChange>,
    retired_tx: Sender<Box<dyn AudioSource>>,
    event_tx: Sender<RecorderEvent>,

    // Per-channel buffers, refreshed from the table at each block.
    buffers: Vec<Arc<SampleBuffer>>,
    // Interleaved input block.
    scratch: Vec<f32>,
    channels: usize,
    max_frames: usize,

    state: RecorderState,
    cursor: usize,
    sample_rate: f32,
    fade_samples: usize,
    fade_pos: usize,
    fade_from: f32,
    gain: f32,
}

/// Control-side half.
pub struct RecorderHandle {
    shared: Arc<Shared>,
    transport_tx: Sender<Transport>,
    input_tx: Sender<InputChange>,
    retired_rx: Receiver<Box<dyn AudioSource>>,
    event_rx: Receiver<RecorderEvent>,
}

impl TableRecorder {
    /// Bind `input` to `table`. `fade_time` (seconds) shapes the start and the
    /// early stop of every take.
    ///
    /// All buffers the audio thread needs are allocated here, sized for
    /// `engine.block_size` frames; larger blocks are processed in chunks.
    pub fn new(
        input: Box<dyn AudioSource>,
        table: Arc<RecordableTable>,
        fade_time: f32,
        engine: &EngineConfig,
    ) -> (TableRecorder, RecorderHandle) {
        let channels = table.channel_count();
        let max_frames = engine.block_size.max(1);
        let buffers = (0..channels).filter_map(|c| table.buffer(c)).collect();

        let (transport_tx, transport_rx) = channel::bounded(TRANSPORT_QUEUE);
        let (input_tx, input_rx) = channel::bounded(INPUT_QUEUE);
        // Every accepted input change retires at most one source.
        let (retired_tx, retired_rx) = channel::bounded(INPUT_QUEUE * 2 + 2);
        let (event_tx, event_rx) = channel::bounded(EVENT_QUEUE);

        let shared = Arc::new(Shared {
            state: AtomicCell::new(RecorderState::Idle),
            cursor: AtomicUsize::new(0),
        });

        log::debug!(
            "table recorder: {} channel(s), {} samples, fade {}s",
            channels,
            table.size(),
            fade_time
        );

        let recorder = TableRecorder {
            fader: InputFader::new(input, max_frames * channels),
            table,
            fade_time: fade_time.max(0.0),
            shared: Arc::clone(&shared),
            transport_rx,
            input_rx,
            retired_tx,
            event_tx,
            buffers,
            scratch: vec![0.0; max_frames * channels],
            channels,
            max_frames,
            state: RecorderState::Idle,
            cursor: 0,
            sample_rate: engine.sample_rate as f32,
            fade_samples: 0,
            fade_pos: 0,
            fade_from: 0.0,
            gain: 0.0,
        };

        let handle = RecorderHandle {
            shared,
            transport_tx,
            input_tx,
            retired_rx,
            event_rx,
        };

        (recorder, handle)
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn table(&self) -> &Arc<RecordableTable> {
        &self.table
    }

    fn fade_length(&self) -> usize {
        (self.fade_time * self.sample_rate).round() as usize
    }

    fn apply_input_changes(&mut self) {
        while let Ok(change) = self.input_rx.try_recv() {
            let fade = (change.fade_time.max(0.0) * self.sample_rate).round() as usize;
            if let Some(old) = self.fader.set_input(change.source, fade) {
                self.retire(old);
            }
        }
    }

    fn apply_transport(&mut self) {
        while let Ok(command) = self.transport_rx.try_recv() {
            match command {
                Transport::Play => self.start(),
                Transport::Stop => self.request_stop(),
            }
        }
    }

    /// Idle/Done -> FadingIn from the top of the table. Ignored while a take
    /// is running.
    fn start(&mut self) {
        if self.state.is_writing() {
            return;
        }
        self.cursor = 0;
        self.fade_samples = self.fade_length();
        self.fade_pos = 0;
        self.gain = 0.0;
        self.state = if self.fade_samples == 0 {
            RecorderState::Recording
        } else {
            RecorderState::FadingIn
        };
    }

    /// Begin the fade-out from whatever gain is current. Ignored unless
    /// fading in or recording.
    fn request_stop(&mut self) {
        let from = match self.state {
            RecorderState::FadingIn => self.fade_pos as f32 / self.fade_samples as f32,
            RecorderState::Recording => 1.0,
            _ => return,
        };
        self.fade_samples = self.fade_length();
        if self.fade_samples == 0 {
            self.finish();
            return;
        }
        self.fade_from = from;
        self.fade_pos = 0;
        self.state = RecorderState::FadingOut;
    }

    fn finish(&mut self) {
        self.state = RecorderState::Done;
        let _ = self.event_tx.try_send(RecorderEvent::Finished { frames: self.cursor });
    }

    fn retire(&mut self, source: Box<dyn AudioSource>) {
        // Only fails once the handle is gone, when nobody is left to care.
        let _ = self.retired_tx.try_send(source);
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

    fn writable_len(&self) -> usize {
        self.buffers.iter().map(|b| b.len()).min().unwrap_or(0)
    }

    fn render_chunk(&mut self, frames: usize, size: usize) {
        let channels = self.channels;
        let block = &mut self.scratch[..frames * channels];
        self.fader.fill_buffer(block, self.sample_rate, channels, frames);
        if let Some(old) = self.fader.take_retired() {
            self.retire(old);
        }

        for frame in 0..frames {
            let gain = match self.state {
                RecorderState::Idle | RecorderState::Done => break,
                RecorderState::FadingIn => self.fade_pos as f32 / self.fade_samples as f32,
                RecorderState::Recording => 1.0,
                RecorderState::FadingOut => {
                    self.fade_from * (1.0 - self.fade_pos as f32 / self.fade_samples as f32)
                }
            };

            let start = frame * channels;
            for (buffer, &sample) in self.buffers.iter().zip(&self.scratch[start..start + channels]) {
                buffer.set(self.cursor, sample * gain);
            }
            self.gain = gain;
            self.cursor += 1;
            self.fade_pos += 1;

            if self.cursor >= size {
                // The end of the table is a natural boundary; no fade-out.
                self.finish();
            } else if self.state == RecorderState::FadingIn && self.fade_pos >= self.fade_samples {
                self.state = RecorderState::Recording;
            } else if self.state == RecorderState::FadingOut && self.fade_pos >= self.fade_samples {
                self.finish();
            }
        }
    }

    fn publish_status(&self) {
        self.shared.cursor.store(self.cursor, Ordering::Release);
        self.shared.state.store(self.state);
    }
}

impl AudioCallback for TableRecorder {
    fn process(&mut self, _output: &mut [f32], sample_rate: f32, _channels: usize, frames: usize) {
        if sample_rate > 0.0 {
            self.sample_rate = sample_rate;
        }
        self.apply_input_changes();
        self.apply_transport();
        self.refresh_buffers();

        let size = self.writable_len();
        if self.state.is_writing() && self.cursor >= size {
            self.finish();
        }

        let mut remaining = frames;
        while remaining > 0 {
            let chunk = remaining.min(self.max_frames);
            self.render_chunk(chunk, size);
            remaining -= chunk;
        }

        self.publish_status();
    }
}

impl RecorderHandle {
    /// Arm a new take from the start of the table. Has no effect while a take
    /// is already running.
    ///
    /// Returns `false` if the command queue is full and the request was dropped.
    pub fn play(&self) -> bool {
        self.send_transport(Transport::Play)
    }

    /// Fade out and end the current take. Has no effect when nothing is
    /// being recorded.
    ///
    /// Returns `false` if the command queue is full and the request was dropped.
    pub fn stop(&self) -> bool {
        self.send_transport(Transport::Stop)
    }

    fn send_transport(&self, command: Transport) -> bool {
        match self.transport_tx.try_send(command) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("recorder command queue full; {:?} dropped", command);
                false
            }
        }
    }

    /// Crossfade the recorded signal to `source` over `fade_time` seconds.
    /// The take in progress and its cursor are unaffected.
    ///
    /// Returns `false` if the change queue is full and the source was dropped.
    pub fn set_input(&self, source: Box<dyn AudioSource>, fade_time: f32) -> bool {
        self.collect_garbage();
        match self.input_tx.try_send(InputChange { source, fade_time }) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("recorder input queue full; input change dropped");
                false
            }
        }
    }

    /// State as of the last processed block.
    pub fn state(&self) -> RecorderState {
        self.shared.state.load()
    }

    /// Write position as of the last processed block.
    pub fn cursor(&self) -> usize {
        self.shared.cursor.load(Ordering::Acquire)
    }

    pub fn poll_event(&self) -> Option<RecorderEvent> {
        let event = self.event_rx.try_recv().ok()?;
        let RecorderEvent::Finished { frames } = event;
        log::info!("recording finished after {} frames", frames);
        Some(event)
    }

    /// Drop input sources the audio thread has finished with. Returns how
    /// many were released.
    pub fn collect_garbage(&self) -> usize {
        self.retired_rx.try_iter().count()
    }
}
