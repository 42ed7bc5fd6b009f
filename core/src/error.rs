use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioModemError {
    #[error("Cannot read {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt audio container: {0}")]
    ContainerCorrupt(String),

    #[error("Configuration mismatch: expected {expected}, found {found}")]
    ConfigMismatch { expected: String, found: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Character {ch:?} at position {index} does not fit in a single byte")]
    CharOutOfRange { ch: char, index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for AudioModemError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => AudioModemError::Io(io),
            other => AudioModemError::ContainerCorrupt(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AudioModemError>;
