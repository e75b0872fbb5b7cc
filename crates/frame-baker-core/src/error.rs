use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameBakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to decode frame {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Frame {path} has no pixel above the transparency threshold")]
    DegenerateFrame { path: PathBuf },
    #[error(
        "All frames in a spritesheet must have the same size (expected: {expected:?}, got: {actual:?} in {path})"
    )]
    DimensionMismatch {
        path: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("No frames found in {0}")]
    EmptySequence(PathBuf),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Sequence '{name}': {source}")]
    Sequence {
        name: String,
        #[source]
        source: Box<FrameBakeError>,
    },
}

impl FrameBakeError {
    /// Attach the sequence name to an error, unless it already carries one.
    pub fn in_sequence(self, name: &str) -> Self {
        match self {
            e @ FrameBakeError::Sequence { .. } => e,
            other => FrameBakeError::Sequence {
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through `Sequence` wrappers.
    pub fn root(&self) -> &FrameBakeError {
        match self {
            FrameBakeError::Sequence { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameBakeError>;
