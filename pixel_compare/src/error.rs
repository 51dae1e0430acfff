// THEORY:
// Every way a single comparison can go wrong is one variant of `CompareError`.
// The orchestrator is the only place these are turned into a
// `ComparisonResult::Failed`; nothing below it decides how a failure is shown.
// A dimension mismatch is deliberately absent: it is an outcome, not a fault.

use std::path::PathBuf;

/// Errors raised while loading, analysing or rendering one image pair.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// A source file does not exist or cannot be read.
    #[error("image file not found: {}", path.display())]
    InputMissing { path: PathBuf },

    /// The bytes could not be decoded as a raster image.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A raw buffer did not match the dimensions it was declared with.
    #[error("pixel buffer of {len} bytes does not fit {width}x{height} RGBA")]
    BufferSize { width: u32, height: u32, len: usize },

    /// Writing a rendered artifact failed after the pixel comparison succeeded.
    #[error("failed to render {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// An artifact file or its directory could not be created.
    #[error("failed to write {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tunable is outside the range the engine can work with.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A line of a pair manifest could not be parsed.
    #[error("manifest line {line}: {reason}")]
    Manifest { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, CompareError>;
