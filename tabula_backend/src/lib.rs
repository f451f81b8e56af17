//! # tabula-backend
//!
//! Real-time side of the table subsystem: the per-block callback contract,
//! click-free input switching, live recording into tables and a table-reading
//! oscillator.

pub mod rt_processing;

pub use rt_processing::callback::{AudioCallback, CallbackSlot};
pub use rt_processing::fader::InputFader;
pub use rt_processing::recorder::{
    DEFAULT_INPUT_FADE, RecorderEvent, RecorderHandle, RecorderState, TableRecorder,
};
pub use rt_processing::source::{AudioSource, ConstantSource};
pub use rt_processing::waveform::TableOscillator;
