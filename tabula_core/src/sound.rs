//! Sound file decoding.
//!
//! Reads WAV files with `hound` and converts every supported sample format to
//! `f32` in `[-1.0, 1.0]`. Decoding happens on the control side only.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use dasp::sample::ToSample;
use hound::{SampleFormat, WavReader};

use crate::error::{Result, TableError};

/// Header facts about a sound: frame count, rate and channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundInfo {
    /// Frames per channel.
    pub frames: usize,
    pub sample_rate: u32,
    pub channels: usize,
}

/// A fully decoded sound, one sample vector per channel.
#[derive(Debug, Clone)]
pub struct DecodedSound {
    pub info: SoundInfo,
    channels: Vec<Vec<f32>>,
}

impl DecodedSound {
    /// Samples of one source channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

type Reader = WavReader<BufReader<File>>;

fn open(path: &Path) -> Result<Reader> {
    WavReader::open(path).map_err(|source| TableError::SoundFile {
        path: path.to_path_buf(),
        source,
    })
}

fn info_of(reader: &Reader) -> SoundInfo {
    let spec = reader.spec();
    SoundInfo {
        frames: reader.duration() as usize,
        sample_rate: spec.sample_rate,
        channels: spec.channels as usize,
    }
}

/// Read only the header of `path`.
pub fn sound_info(path: impl AsRef<Path>) -> Result<SoundInfo> {
    let reader = open(path.as_ref())?;
    Ok(info_of(&reader))
}

/// Decode every channel of `path`.
pub fn decode(path: impl AsRef<Path>) -> Result<DecodedSound> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let info = info_of(&reader);
    let spec = reader.spec();

    if info.channels == 0 || info.frames == 0 {
        return Err(TableError::UnsupportedFormat {
            path: path.to_path_buf(),
            detail: "sound contains no audio frames".into(),
        });
    }

    let channels = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => deinterleave(reader.samples::<f32>(), info, path)?,
        (SampleFormat::Int, 8) => deinterleave(reader.samples::<i8>(), info, path)?,
        (SampleFormat::Int, 16) => deinterleave(reader.samples::<i16>(), info, path)?,
        (SampleFormat::Int, 24) => {
            // 24-bit frames arrive in an i32 container; scale by the 24-bit range.
            let scale = 1.0 / (1i32 << 23) as f32;
            let samples = reader.samples::<i32>().map(|s| s.map(|x| x as f32 * scale));
            deinterleave(samples, info, path)?
        }
        (SampleFormat::Int, 32) => deinterleave(reader.samples::<i32>(), info, path)?,
        (format, bits) => {
            return Err(TableError::UnsupportedFormat {
                path: path.to_path_buf(),
                detail: format!("{bits}-bit {format:?}"),
            });
        }
    };

    log::info!(
        "decoded {:?}: {} frames, {} Hz, {} channel(s)",
        path,
        info.frames,
        info.sample_rate,
        info.channels
    );

    Ok(DecodedSound { info, channels })
}

fn deinterleave<S, I>(samples: I, info: SoundInfo, path: &Path) -> Result<Vec<Vec<f32>>>
where
    S: ToSample<f32>,
    I: Iterator<Item = std::result::Result<S, hound::Error>>,
{
    let mut channels: Vec<Vec<f32>> = (0..info.channels)
        .map(|_| Vec::with_capacity(info.frames))
        .collect();

    for (i, sample) in samples.enumerate() {
        let sample = sample.map_err(|source| TableError::SoundFile {
            path: path.to_path_buf(),
            source,
        })?;
        channels[i % info.channels].push(sample.to_sample_());
    }

    // A truncated final frame leaves channels uneven; keep whole frames only.
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    for channel in &mut channels {
        channel.truncate(frames);
    }
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, channels: u16, frames: &[Vec<i16>]) {
        let spec = WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &s in frame {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_info_and_decode_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[vec![0, 16384], vec![-16384, 0], vec![8192, -32768]]);

        let info = sound_info(&path).unwrap();
        assert_eq!(info, SoundInfo { frames: 3, sample_rate: 22050, channels: 2 });

        let sound = decode(&path).unwrap();
        let left = sound.channel(0).unwrap();
        let right = sound.channel(1).unwrap();
        assert_eq!(left.len(), 3);
        assert!((left[1] + 0.5).abs() < 1e-4);
        assert!((right[0] - 0.5).abs() < 1e-4);
        assert!((right[2] + 1.0).abs() < 1e-4);
        assert!(sound.channel(2).is_none());
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let err = decode("/definitely/not/here.wav").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Resource);
        assert!(sound_info("/definitely/not/here.wav").is_err());
    }

    #[test]
    fn test_garbage_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"this is not a riff file").unwrap();
        assert!(matches!(decode(&path), Err(TableError::SoundFile { .. })));
    }

    #[test]
    fn test_empty_sound_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, 1, &[]);
        assert!(matches!(decode(&path), Err(TableError::UnsupportedFormat { .. })));
    }
}
