use thiserror::Error;

/// Rejected start configuration. No board is created.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Tile count must be positive")]
    ZeroTiles,
    #[error("A board needs at least 2 tiles, got {0}")]
    TooFewTiles(usize),
    #[error("A board holds at most {max} tiles, got {got}")]
    TooManyTiles { got: usize, max: usize },
    #[error("Time limit must be positive")]
    ZeroTimeLimit,
}

/// Failure reported by a stats backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Stored stats are corrupt: {0}")]
    Corrupt(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
