#![doc = include_str!("../README.md")]

mod byte_codec;
pub use byte_codec::{
    TileEncodingFormat, tile_matrix_from_byte_stream, tile_matrix_to_byte_stream,
};

mod codec;
pub use codec::{
    base64_decode_tile_matrix, base64_decode_tile_matrix_with, base64_encode_tile_matrix,
    base64_encode_tile_matrix_with,
};

pub mod compression;
pub use compression::{
    CompressionError, CompressionMode, CompressionProvider, CompressionResult, Compressor,
    NoCompression, ZlibCompressor, ZstdCompressor,
};

mod error;
pub use error::{TileCodecError, TileCodecResult};

mod format;
pub use format::{TileEncoding, TileFormat};

mod matrix;
pub use matrix::{BYTES_PER_TILE, MatrixExtent, TileMatrix};

mod plain_text;
pub use plain_text::{PlainTextDelimiter, tile_matrix_from_plain_text, tile_matrix_to_plain_text};

mod tile_id;
pub use tile_id::{TileFlags, TileId};

mod transcoder;
pub use transcoder::{base64_decode, base64_encode};
