//! End-to-end encoding of tile matrices into the Base64 text stored in save files.
//!
//! Encoding runs `matrix -> byte stream -> compression -> Base64`, decoding runs the
//! same stages in reverse. Every stage short-circuits on failure, so no partial
//! matrix or text is ever returned.

use tracing::debug;

use crate::byte_codec::{tile_matrix_from_byte_stream, tile_matrix_to_byte_stream};
use crate::compression::{CompressionMode, CompressionProvider, CompressionResult};
use crate::transcoder::{base64_decode, base64_encode};
use crate::{MatrixExtent, TileCodecError, TileCodecResult, TileEncodingFormat, TileMatrix};

/// Encodes `matrix` as Base64 text, compressed with the default level of `mode`.
///
/// A matrix without tiles encodes to an empty string regardless of `mode`.
pub fn base64_encode_tile_matrix(
    matrix: &TileMatrix,
    mode: CompressionMode,
) -> CompressionResult<String> {
    base64_encode_tile_matrix_with(matrix, &mode.compressor())
}

/// Same as [`base64_encode_tile_matrix`], using a configured compression provider.
pub fn base64_encode_tile_matrix_with(
    matrix: &TileMatrix,
    provider: &impl CompressionProvider,
) -> CompressionResult<String> {
    let bytes = tile_matrix_to_byte_stream(matrix);
    if bytes.is_empty() {
        return Ok(String::new());
    }

    let compressed = provider.compress(&bytes)?;
    debug!(
        "Encoded {} tile matrix into {} bytes ({} before compression)",
        matrix.extent(),
        compressed.len(),
        bytes.len()
    );
    Ok(base64_encode(&compressed))
}

/// Decodes Base64 `text` into a matrix of `extent`, decompressing it with `mode` first.
///
/// With [`TileEncodingFormat::Tiled`] the flip and rotation flags are cleared from every tile.
pub fn base64_decode_tile_matrix(
    text: &str,
    extent: MatrixExtent,
    mode: CompressionMode,
    format: TileEncodingFormat,
) -> TileCodecResult<TileMatrix> {
    base64_decode_tile_matrix_with(text, extent, &mode.compressor(), format)
}

/// Same as [`base64_decode_tile_matrix`], using a given compression provider.
///
/// Decompression stops as soon as the output outgrows the byte length of `extent`.
pub fn base64_decode_tile_matrix_with(
    text: &str,
    extent: MatrixExtent,
    provider: &impl CompressionProvider,
    format: TileEncodingFormat,
) -> TileCodecResult<TileMatrix> {
    let Some(expected) = extent.byte_len() else {
        return Err(TileCodecError::ExtentTooLarge(extent));
    };
    let decoded = base64_decode(text)?;
    if decoded.is_empty() && expected == 0 {
        return TileMatrix::new(extent);
    }

    let bytes = provider.decompress_bounded(&decoded, expected)?;
    debug!(
        "Decoding {} tile matrix from {} bytes ({} after decompression)",
        extent,
        decoded.len(),
        bytes.len()
    );
    tile_matrix_from_byte_stream(&bytes, extent, format)
}
