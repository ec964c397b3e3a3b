use std::path::PathBuf;

use thiserror::Error;

// Everything that can be wrong with a map before any geometry is emitted
#[derive(Debug, Error)]
pub enum MapError {
    #[error("river path needs at least 2 control points, got {0}")]
    RiverTooShort(usize),

    #[error("river control point {index} is invalid: {reason}")]
    InvalidControlPoint { index: usize, reason: &'static str },

    #[error("pond is invalid: {0}")]
    InvalidPond(&'static str),

    #[error("height-field grid is invalid: {0}")]
    InvalidGrid(&'static str),

    #[error("scatter settings are invalid: {0}")]
    InvalidScatter(String),

    #[error("failed to read map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse map file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize map: {0}")]
    Serialize(#[from] toml::ser::Error),
}
