use crate::compression::CompressionError;
use crate::matrix::MatrixExtent;

/// Errors that can occur while encoding or decoding tile layer data.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum TileCodecError {
    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error("Tile data is not valid Base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Tile data has {actual} bytes, but a {extent} tile matrix requires {expected} bytes")]
    LengthMismatch {
        extent: MatrixExtent,
        expected: usize,
        actual: usize,
    },

    #[error("Tile data has {actual} tiles, but a {extent} tile matrix requires {expected} tiles")]
    TileCountMismatch {
        extent: MatrixExtent,
        expected: usize,
        actual: usize,
    },

    #[error("A {0} tile matrix is too large to be encoded")]
    ExtentTooLarge(MatrixExtent),

    #[error("Tile matrix row {row} has {actual} tiles, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid tile identifier `{token}` at tile index {index}")]
    InvalidPlainTile { index: usize, token: String },

    #[error("Unsupported tile compression format `{0}`, expected one of: zlib, zstd")]
    UnknownCompression(String),

    #[error("Unsupported tile encoding `{0}`, expected one of: csv, plain-text, base64")]
    UnknownEncoding(String),

    #[error("Tile data stored as plain text cannot be compressed")]
    PlainEncodingWithCompression,
}

pub type TileCodecResult<T> = Result<T, TileCodecError>;
