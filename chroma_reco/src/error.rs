// THEORY:
// Almost everything in this crate is pure arithmetic over well-formed inputs, so
// the error surface is deliberately narrow. Degenerate histograms and empty
// classes are *not* errors: they have defined fallback values (all-zero cells,
// a zero centroid, the "never wins" distance). What remains are caller-side
// preconditions that are cheap to check at the boundary of a scan or a session
// command, and the one genuine runtime failure of the parallel scanner (a worker
// task that panicked or was cancelled).

use thiserror::Error;

/// Result type alias for chroma_reco operations.
pub type Result<T> = std::result::Result<T, RecoError>;

/// Errors raised at the boundaries of the recognition engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecoError {
    /// A scan was requested against an empty class list. The background class
    /// must always be present.
    #[error("no classes registered: the background class must always exist")]
    NoClasses,

    /// Block sizes must be strictly positive.
    #[error("invalid block size: {0}")]
    InvalidBlockSize(u32),

    /// A region does not fit inside the image it is read from.
    #[error(
        "region {width}x{height} at ({x}, {y}) exceeds image bounds {image_width}x{image_height}"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// An exemplar was added before any object class was created.
    #[error("no object class exists yet: create one before adding exemplars")]
    NoObjectClass,

    /// Recognition needs at least one object class besides the background.
    #[error("recognition requires at least one object class")]
    RecognitionUnavailable,

    /// A byte slice is neither RGB (3 bytes) nor RGBA (4 bytes).
    #[error("cannot convert {0} bytes into a pixel")]
    InvalidPixelBytes(usize),

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A parallel scan worker failed to complete.
    #[error("scan worker failed: {0}")]
    Worker(String),
}
