use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading or reshaping a pixel table.
///
/// None of these are fatal: the caller decides whether to report and
/// exit, or retry with another source.
#[derive(Debug, Error)]
pub enum MsiError {
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("malformed row at line {row}: {reason}")]
    MalformedRow { row: u64, reason: String },

    #[error("table is missing the 'X' and/or 'Y' coordinate columns")]
    MissingCoordinateColumns,

    #[error("cannot drop unknown channel '{0}'")]
    UnknownChannel(String),

    #[error("channel '{0}' is not present in the table")]
    ChannelNotFound(String),

    #[error("channel '{0}' is reserved and cannot be normalised")]
    ReservedChannel(String),

    #[error("channel name '{0}' would not survive a cleaned-table round trip")]
    UnwritableChannel(String),

    #[error("record has {got} values but the table declares {expected} channels")]
    RaggedRecord { expected: usize, got: usize },

    #[error("invalid loader configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MsiError>;

impl MsiError {
    pub(crate) fn malformed_row<S: Into<String>>(row: u64, reason: S) -> Self {
        MsiError::MalformedRow {
            row,
            reason: reason.into(),
        }
    }
}
