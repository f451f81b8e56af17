use super::{Table, TableStorage};
use crate::config::EngineConfig;
use crate::error::{Result, TableError};

/// Silent multi-channel table sized for live capture.
///
/// The size is fixed at creation: `round(seconds * sample_rate)` samples per
/// channel.
pub struct RecordableTable {
    sample_rate: f64,
    storage: TableStorage,
}

impl RecordableTable {
    pub fn new(seconds: f64, channels: usize, engine: &EngineConfig) -> Result<Self> {
        engine.validate()?;
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(TableError::InvalidDuration);
        }
        let size = engine.seconds_to_samples(seconds);
        let storage = TableStorage::silent(channels, size)?;
        log::debug!("recordable table: {} channel(s) x {} samples", channels, size);

        Ok(Self {
            sample_rate: engine.sample_rate,
            storage,
        })
    }

    /// Length in seconds at the engine rate.
    pub fn length(&self) -> f64 {
        self.size() as f64 / self.sample_rate
    }

    /// Frequency in Hz at which one pass over the table lasts as long as the
    /// recording.
    pub fn rate(&self) -> f64 {
        self.sample_rate / self.size() as f64
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Zero every channel in place.
    pub fn clear(&self) {
        for slot in self.storage.slots() {
            slot.load().fill(0.0);
        }
    }
}

impl Table for RecordableTable {
    fn storage(&self) -> &TableStorage {
        &self.storage
    }

    fn set_size(&self, _size: usize) -> Result<()> {
        Err(TableError::NotResizable)
    }
}
