use thiserror::Error;

/// Main error type for playlist mutations
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// The segment window has no free slot left
    #[error("playlist is full")]
    PlaylistFull,

    /// The operation needs at least one live segment (or a non-empty input list)
    #[error("playlist is empty")]
    PlaylistEmpty,

    /// The requested window size does not fit in the segment buffer
    #[error("window size {window} exceeds playlist capacity {capacity}")]
    WindowSizeExceedsCapacity { window: usize, capacity: usize },

    /// A date range was supplied without its mandatory ID attribute
    #[error("date range is missing its ID")]
    MissingDateRangeId,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PlaylistError>;
