//! Conversion between tile matrices and flat little-endian byte streams.
//!
//! Every tile is stored as 4 bytes, least significant byte first, in row-major order.
//! The stream has no header and no padding.

use tracing::debug;

use crate::matrix::BYTES_PER_TILE;
use crate::{MatrixExtent, TileCodecError, TileCodecResult, TileId, TileMatrix};

/// Selects how tile identifiers read from a byte stream are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TileEncodingFormat {
    /// Identifiers are stored verbatim.
    #[default]
    Tactile,
    /// Identifiers may carry Tiled flip/rotation flags, which are stripped on decode.
    Tiled,
}

impl TileEncodingFormat {
    #[must_use]
    pub fn normalize(self, id: TileId) -> TileId {
        match self {
            Self::Tactile => id,
            Self::Tiled => id.strip_flags(),
        }
    }
}

/// Encodes all tiles of `matrix` as little-endian `u32` values.
///
/// The result is exactly `rows * cols * 4` bytes long.
#[must_use]
pub fn tile_matrix_to_byte_stream(matrix: &TileMatrix) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(matrix.tiles().len() * BYTES_PER_TILE);
    for tile in matrix.tiles() {
        bytes.extend_from_slice(&tile.value().to_le_bytes());
    }
    bytes
}

/// Decodes a byte stream produced by [`tile_matrix_to_byte_stream`] into a matrix of `extent`.
///
/// The stream must be exactly `rows * cols * 4` bytes long.
pub fn tile_matrix_from_byte_stream(
    bytes: &[u8],
    extent: MatrixExtent,
    format: TileEncodingFormat,
) -> TileCodecResult<TileMatrix> {
    let expected = extent
        .byte_len()
        .ok_or(TileCodecError::ExtentTooLarge(extent))?;
    if bytes.len() != expected {
        debug!(
            "Rejecting tile byte stream of {} bytes for a {extent} matrix",
            bytes.len()
        );
        return Err(TileCodecError::LengthMismatch {
            extent,
            expected,
            actual: bytes.len(),
        });
    }

    let tiles = bytes
        .chunks_exact(BYTES_PER_TILE)
        .map(|chunk| {
            let value = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            format.normalize(TileId::new(value))
        })
        .collect();

    TileMatrix::from_tiles(extent, tiles)
}
