pub mod breakpoint;
pub mod harmonic;
pub mod recordable;
pub mod soundfile;
pub mod window;

use std::sync::Arc;

use crate::buffer::{BufferSlot, SampleBuffer};
use crate::error::{Result, TableError};

/// Default length of the analytic tables, in samples.
pub const DEFAULT_TABLE_SIZE: usize = 8192;

/// Per-channel buffers of one table.
///
/// Channels are a flat array of independently allocated slots that share a
/// nominal size. Operations that touch "the table" broadcast across the array.
#[derive(Debug)]
pub struct TableStorage {
    slots: Box<[BufferSlot]>,
}

impl TableStorage {
    /// `channels` buffers of `size` zeros.
    pub fn silent(channels: usize, size: usize) -> Result<Self> {
        if channels == 0 {
            return Err(TableError::InvalidChannelCount);
        }
        let size = validate_size(size)?;
        Ok(Self {
            slots: (0..channels)
                .map(|_| BufferSlot::new(SampleBuffer::silent(size)))
                .collect(),
        })
    }

    /// One slot per entry of `channels`. Every channel must hold the same,
    /// non-zero number of samples.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Result<Self> {
        let size = channels.first().map(Vec::len).ok_or(TableError::InvalidChannelCount)?;
        validate_size(size)?;
        if channels.iter().any(|c| c.len() != size) {
            return Err(TableError::InvalidSize);
        }
        Ok(Self {
            slots: channels
                .into_iter()
                .map(|c| BufferSlot::new(SampleBuffer::from_vec(c)))
                .collect(),
        })
    }

    /// Single-channel storage around already validated samples.
    pub(crate) fn mono(samples: Vec<f32>) -> Self {
        debug_assert!(!samples.is_empty());
        Self {
            slots: vec![BufferSlot::new(SampleBuffer::from_vec(samples))].into_boxed_slice(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.slots.len()
    }

    /// Current length of the first channel; all channels agree outside of an
    /// in-flight resize.
    pub fn size(&self) -> usize {
        self.slots[0].len()
    }

    pub fn slot(&self, channel: usize) -> Option<&BufferSlot> {
        self.slots.get(channel)
    }

    pub fn slots(&self) -> &[BufferSlot] {
        &self.slots
    }

    /// Swap in new contents for one channel.
    pub fn publish(&self, channel: usize, samples: Vec<f32>) {
        if let Some(slot) = self.slots.get(channel) {
            slot.publish(SampleBuffer::from_vec(samples));
        }
    }

    /// Swap the same contents into every channel.
    pub fn publish_all(&self, samples: Vec<f32>) {
        let last = self.slots.len() - 1;
        for slot in &self.slots[..last] {
            slot.publish(SampleBuffer::from_vec(samples.clone()));
        }
        self.slots[last].publish(SampleBuffer::from_vec(samples));
    }

    /// Release retired buffers that readers have let go of.
    pub fn reclaim(&self) -> usize {
        self.slots.iter().map(BufferSlot::reclaim).sum()
    }
}

/// Common contract of every table.
///
/// Readers use [`Table::buffer`] (or the slot's realtime `try_load`) and do
/// their own indexing or interpolation. All mutating calls validate first and
/// publish last.
pub trait Table: Send + Sync {
    fn storage(&self) -> &TableStorage;

    /// Reallocate every channel to `size` samples.
    fn set_size(&self, size: usize) -> Result<()>;

    fn size(&self) -> usize {
        self.storage().size()
    }

    fn channel_count(&self) -> usize {
        self.storage().channel_count()
    }

    /// Snapshot of one channel's current buffer.
    fn buffer(&self, channel: usize) -> Option<Arc<SampleBuffer>> {
        self.storage().slot(channel).map(BufferSlot::load)
    }

    /// Copy of one channel's samples.
    fn to_vec(&self, channel: usize) -> Option<Vec<f32>> {
        self.buffer(channel).map(|b| b.to_vec())
    }
}

/// Reject zero-length tables.
pub(crate) fn validate_size(size: usize) -> Result<usize> {
    if size == 0 {
        Err(TableError::InvalidSize)
    } else {
        Ok(size)
    }
}
