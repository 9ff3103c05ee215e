use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort an operation.
///
/// Problems inside a single subtitle record are never reported here; they are
/// recorded as warnings on the [`TimedTextObject`](crate::TimedTextObject)
/// that was being built.
#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported subtitle format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Unknown character encoding: '{0}'")]
    Encoding(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parsing was cancelled")]
    Cancelled,
}

impl SubtitleError {
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        SubtitleError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = SubtitleError> = std::result::Result<T, E>;
