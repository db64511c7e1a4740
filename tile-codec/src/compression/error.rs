use std::fmt::Display;

use crate::compression::CompressionMode;

/// Errors reported by a [`CompressionProvider`](crate::CompressionProvider).
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum CompressionError {
    /// Compression or decompression was requested for an empty buffer.
    #[error("There is no data to process")]
    NoData,

    /// The underlying engine reported an unexpected status, e.g. a corrupt or truncated stream.
    #[error("{mode} engine failure: {reason}")]
    InternalError {
        mode: CompressionMode,
        reason: String,
    },

    /// Decompressed data grew past the number of bytes the caller expects.
    #[error("{mode} data expands beyond the expected {limit} bytes")]
    OutputTooLarge { mode: CompressionMode, limit: usize },

    #[error(
        "Compression level {level} is not supported by {mode}, expected a value in {min}..={max}"
    )]
    InvalidLevel {
        mode: CompressionMode,
        level: i32,
        min: i32,
        max: i32,
    },
}

impl CompressionError {
    pub(crate) fn internal<R: Display + ?Sized>(mode: CompressionMode, reason: &R) -> Self {
        Self::InternalError {
            mode,
            reason: reason.to_string(),
        }
    }
}

pub type CompressionResult<T> = Result<T, CompressionError>;
