//! # tabula-core
//!
//! Fixed-length sample tables for a real-time audio engine.
//!
//! Tables are synthesized ([`HarmonicTable`], [`WindowTable`],
//! [`BreakpointTable`]), loaded from sound files ([`SoundFileTable`]) or
//! allocated empty for live capture ([`RecordableTable`]). Every table keeps one
//! independently allocated buffer per channel and replaces buffers by atomic
//! swap, so audio-thread readers never see a partially written buffer.
//!
//! ```rust,ignore
//! use tabula_core::{HarmonicTable, Table};
//!
//! let saw_ish = HarmonicTable::new(vec![1.0, 0.5, 0.33, 0.25], 2048)?;
//! saw_ish.set_size(4096)?; // re-rendered from the weights
//! let cycle = saw_ish.buffer(0).unwrap();
//! let sample = cycle.lerp(1234.5);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod sound;
pub mod table;

pub use buffer::{BufferSlot, SampleBuffer};
pub use config::EngineConfig;
pub use error::{ErrorKind, Result, TableError};
pub use sound::{DecodedSound, SoundInfo, decode, sound_info};
pub use table::breakpoint::{Breakpoint, BreakpointTable};
pub use table::harmonic::HarmonicTable;
pub use table::recordable::RecordableTable;
pub use table::soundfile::{ChannelSelector, SoundFileTable};
pub use table::window::WindowTable;
pub use table::{DEFAULT_TABLE_SIZE, Table, TableStorage};
