use std::path::PathBuf;

/// Broad classes of table failures.
///
/// Every error is raised synchronously on the control side, before any new
/// buffer is published. The real-time path has no error states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad sizes, breakpoints, weights or engine settings supplied by the caller.
    Configuration,
    /// A sound file or config document could not be read or decoded.
    Resource,
    /// The operation is not supported for this table in its current form.
    State,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("table size must be at least one sample")]
    InvalidSize,

    #[error("harmonic weight {index} is not a finite number")]
    NonFiniteWeight { index: usize },

    #[error("breakpoint {index} has a non-finite value")]
    NonFiniteValue { index: usize },

    #[error("breakpoint list is empty")]
    EmptyBreakpoints,

    #[error("breakpoint {index} at location {location} lies outside a table of {size} samples")]
    BreakpointOutOfRange {
        index: usize,
        location: usize,
        size: usize,
    },

    #[error("breakpoint {index} does not come strictly after the previous one")]
    BreakpointNotIncreasing { index: usize },

    #[error("a table needs at least one channel")]
    InvalidChannelCount,

    #[error("recording length must be a positive, finite number of seconds")]
    InvalidDuration,

    #[error("invalid engine configuration: {0}")]
    InvalidEngineConfig(&'static str),

    #[error("channel {channel} requested but the sound only has {available}")]
    ChannelOutOfRange { channel: usize, available: usize },

    #[error("failed to read sound file {path:?}")]
    SoundFile {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("unsupported sound format in {path:?}: {detail}")]
    UnsupportedFormat { path: PathBuf, detail: String },

    #[error("failed to parse engine configuration")]
    Config(#[from] serde_json::Error),

    #[error("recording tables keep the size they were created with")]
    NotResizable,
}

impl TableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::InvalidSize
            | TableError::NonFiniteWeight { .. }
            | TableError::NonFiniteValue { .. }
            | TableError::EmptyBreakpoints
            | TableError::BreakpointOutOfRange { .. }
            | TableError::BreakpointNotIncreasing { .. }
            | TableError::InvalidChannelCount
            | TableError::InvalidDuration
            | TableError::InvalidEngineConfig(_)
            | TableError::ChannelOutOfRange { .. } => ErrorKind::Configuration,
            TableError::SoundFile { .. }
            | TableError::UnsupportedFormat { .. }
            | TableError::Config(_) => ErrorKind::Resource,
            TableError::NotResizable => ErrorKind::State,
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(TableError::InvalidSize.kind(), ErrorKind::Configuration);
        assert_eq!(
            TableError::BreakpointNotIncreasing { index: 2 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(TableError::NotResizable.kind(), ErrorKind::State);

        let err = TableError::UnsupportedFormat {
            path: PathBuf::from("x.wav"),
            detail: "64-bit float".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = TableError::BreakpointOutOfRange { index: 1, location: 9000, size: 8192 };
        let msg = err.to_string();
        assert!(msg.contains("9000"));
        assert!(msg.contains("8192"));
    }
}
