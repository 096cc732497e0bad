//! Error types for csmap

use thiserror::Error;

/// Main error type for csmap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("GDAL error: {0}")]
    #[cfg(feature = "gdal")]
    Gdal(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Degenerate scale for {name}: max ({max}) must be greater than min ({min})")]
    DegenerateScale { name: &'static str, min: f64, max: f64 },

    #[error("Chunk size {chunk_size} too small: at least {required} pixels needed")]
    ChunkTooSmall { chunk_size: usize, required: usize },

    #[error("Tile at ({col}, {row}) failed: {source}")]
    Tile {
        col: usize,
        row: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Run cancelled after an earlier tile failure")]
    Cancelled,

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(e.to_string())
    }
}

impl Error {
    /// Whether this error is a configuration problem detected before processing
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidParameter { .. }
                | Error::DegenerateScale { .. }
                | Error::ChunkTooSmall { .. }
        )
    }
}

/// Result type alias for csmap operations
pub type Result<T> = std::result::Result<T, Error>;
