//! Error types for grid_pathviz

use thiserror::Error;

/// Failures of grid edits, state exchange and configuration loading.
///
/// Search outcomes such as "no path" or "cancelled" are not errors; see
/// [SearchOutcome](crate::search::SearchOutcome).
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("({row}, {col}) is out of bounds")]
    OutOfBounds { row: usize, col: usize },

    #[error("({row}, {col}) already holds the other endpoint")]
    EndpointConflict { row: usize, col: usize },

    #[error("weight at ({row}, {col}) must be positive")]
    InvalidWeight { row: usize, col: usize },

    #[error("start and goal must be different cells")]
    CoincidentEndpoints,

    #[error("malformed grid state: {0}")]
    MalformedState(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedState(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
