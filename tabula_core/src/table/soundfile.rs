use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{Table, TableStorage, validate_size};
use crate::error::{Result, TableError};
use crate::sound::{self, SoundInfo};

/// Which channels of a sound a [`SoundFileTable`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSelector {
    /// One sub-table per source channel.
    #[default]
    All,
    /// A single sub-table holding this source channel.
    Channel(usize),
}

#[derive(Debug, Clone)]
struct SoundMeta {
    path: PathBuf,
    info: SoundInfo,
}

/// Table filled from a decoded sound file.
///
/// The number of sub-tables is fixed when the table is created; later calls to
/// [`SoundFileTable::set_sound`] map source channels onto them.
pub struct SoundFileTable {
    selector: ChannelSelector,
    meta: Mutex<SoundMeta>,
    storage: TableStorage,
}

impl SoundFileTable {
    pub fn new(path: impl AsRef<Path>, selector: ChannelSelector) -> Result<Self> {
        let path = path.as_ref();
        let decoded = sound::decode(path)?;
        let info = decoded.info;

        let channels = match selector {
            ChannelSelector::All => decoded.into_channels(),
            ChannelSelector::Channel(channel) => {
                if channel >= info.channels {
                    return Err(TableError::ChannelOutOfRange {
                        channel,
                        available: info.channels,
                    });
                }
                vec![decoded.into_channels().swap_remove(channel)]
            }
        };

        Ok(Self {
            selector,
            meta: Mutex::new(SoundMeta {
                path: path.to_path_buf(),
                info,
            }),
            storage: TableStorage::from_channels(channels)?,
        })
    }

    /// Load a new sound while keeping the current number of sub-tables.
    ///
    /// Sub-table `i` takes source channel `i % source_channels`: a sound with
    /// fewer channels wraps around, extra channels are skipped.
    pub fn set_sound(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let decoded = sound::decode(path)?;
        let info = decoded.info;
        let retained = self.storage.channel_count();

        if info.channels < retained {
            log::info!(
                "{:?} has {} channel(s), wrapping onto {} sub-tables",
                path,
                info.channels,
                retained
            );
        }

        let mut meta = self.meta.lock();
        for channel in 0..retained {
            let source = decoded
                .channel(channel % info.channels)
                .map(<[f32]>::to_vec)
                .unwrap_or_default();
            self.storage.publish(channel, source);
        }
        *meta = SoundMeta {
            path: path.to_path_buf(),
            info,
        };
        Ok(())
    }

    /// Frequency in Hz at which reading the whole table once per cycle plays
    /// the sound back at its original pitch.
    pub fn rate(&self) -> f64 {
        self.meta.lock().info.sample_rate as f64 / self.size() as f64
    }

    pub fn path(&self) -> PathBuf {
        self.meta.lock().path.clone()
    }

    pub fn channel_selector(&self) -> ChannelSelector {
        self.selector
    }

    pub fn source_sample_rate(&self) -> u32 {
        self.meta.lock().info.sample_rate
    }

    pub fn source_channel_count(&self) -> usize {
        self.meta.lock().info.channels
    }
}

impl Table for SoundFileTable {
    fn storage(&self) -> &TableStorage {
        &self.storage
    }

    /// Truncate or zero-pad every channel. The loaded content is not
    /// re-derived; reload with [`SoundFileTable::set_sound`] for that.
    fn set_size(&self, size: usize) -> Result<()> {
        let size = validate_size(size)?;
        let _meta = self.meta.lock();
        for (channel, slot) in self.storage.slots().iter().enumerate() {
            let mut samples = slot.load().to_vec();
            samples.resize(size, 0.0);
            self.storage.publish(channel, samples);
        }
        Ok(())
    }
}
