pub mod callback;
pub mod fader;
pub mod recorder;
pub mod source;
pub mod waveform;
