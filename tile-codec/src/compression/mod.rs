//! Compression strategies applied to raw tile byte streams.
//!
//! All providers share the [`CompressionProvider`] interface. [`Compressor`] holds one of
//! them and dispatches to it, and [`CompressionMode::compressor`] builds the provider for a
//! mode parsed from a save file.

mod error;
mod zlib_provider;
mod zstd_provider;

use std::fmt;
use std::str::FromStr;

pub use error::{CompressionError, CompressionResult};
use serde::{Deserialize, Serialize};
pub use zlib_provider::ZlibCompressor;
pub use zstd_provider::ZstdCompressor;

use crate::TileCodecError;

/// Compression applied to a tile byte stream before it is Base64 encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    #[default]
    None,
    Zlib,
    Zstd,
}

impl CompressionMode {
    /// Creates a provider for this mode using the default compression level.
    #[must_use]
    pub fn compressor(self) -> Compressor {
        match self {
            Self::None => Compressor::None(NoCompression),
            Self::Zlib => Compressor::Zlib(ZlibCompressor::default()),
            Self::Zstd => Compressor::Zstd(ZstdCompressor::default()),
        }
    }

    #[must_use]
    pub fn is_compressed(self) -> bool {
        self != Self::None
    }
}

impl FromStr for CompressionMode {
    type Err = TileCodecError;

    /// Parses the `compression` attribute of a tile layer, where an empty value means none.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "zlib" => Ok(Self::Zlib),
            "zstd" => Ok(Self::Zstd),
            _ => Err(TileCodecError::UnknownCompression(s.to_string())),
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Zstd => "zstd",
        })
    }
}

/// A (de)compression algorithm with an adjustable compression level.
///
/// A level of `None` means the algorithm's own default. Setting an unsupported level
/// fails with [`CompressionError::InvalidLevel`] and keeps the previous level.
///
/// Providers hold no state besides their level, so a single instance may be shared
/// between threads as long as the level is not changed concurrently.
pub trait CompressionProvider {
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>>;

    fn decompress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        self.decompress_bounded(data, usize::MAX)
    }

    /// Decompresses `data`, failing with [`CompressionError::OutputTooLarge`] as soon as
    /// the output grows past `limit` bytes.
    fn decompress_bounded(&self, data: &[u8], limit: usize) -> CompressionResult<Vec<u8>>;

    fn compression_level(&self) -> Option<i32>;

    fn set_compression_level(&mut self, level: Option<i32>) -> CompressionResult<()>;

    fn min_compression_level(&self) -> i32;

    fn max_compression_level(&self) -> i32;
}

/// Identity provider used when tile data is stored uncompressed.
///
/// Both directions return a copy of the input, including for empty input, and bounded
/// decompression only checks the input length against the limit. It has no
/// levels, so only `None` is accepted by [`CompressionProvider::set_compression_level`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoCompression;

impl CompressionProvider for NoCompression {
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress_bounded(&self, data: &[u8], limit: usize) -> CompressionResult<Vec<u8>> {
        if data.len() > limit {
            return Err(CompressionError::OutputTooLarge {
                mode: CompressionMode::None,
                limit,
            });
        }
        Ok(data.to_vec())
    }

    fn compression_level(&self) -> Option<i32> {
        None
    }

    fn set_compression_level(&mut self, level: Option<i32>) -> CompressionResult<()> {
        match level {
            None => Ok(()),
            Some(level) => Err(CompressionError::InvalidLevel {
                mode: CompressionMode::None,
                level,
                min: 0,
                max: 0,
            }),
        }
    }

    fn min_compression_level(&self) -> i32 {
        0
    }

    fn max_compression_level(&self) -> i32 {
        0
    }
}

/// One of the supported compression providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compressor {
    None(NoCompression),
    Zlib(ZlibCompressor),
    Zstd(ZstdCompressor),
}

impl Compressor {
    #[must_use]
    pub fn mode(&self) -> CompressionMode {
        match self {
            Self::None(_) => CompressionMode::None,
            Self::Zlib(_) => CompressionMode::Zlib,
            Self::Zstd(_) => CompressionMode::Zstd,
        }
    }

    fn provider(&self) -> &dyn CompressionProvider {
        match self {
            Self::None(p) => p,
            Self::Zlib(p) => p,
            Self::Zstd(p) => p,
        }
    }

    fn provider_mut(&mut self) -> &mut dyn CompressionProvider {
        match self {
            Self::None(p) => p,
            Self::Zlib(p) => p,
            Self::Zstd(p) => p,
        }
    }
}

impl Default for Compressor {
    fn default() -> Self {
        CompressionMode::default().compressor()
    }
}

impl From<CompressionMode> for Compressor {
    fn from(mode: CompressionMode) -> Self {
        mode.compressor()
    }
}

impl CompressionProvider for Compressor {
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        self.provider().compress(data)
    }

    fn decompress_bounded(&self, data: &[u8], limit: usize) -> CompressionResult<Vec<u8>> {
        self.provider().decompress_bounded(data, limit)
    }

    fn compression_level(&self) -> Option<i32> {
        self.provider().compression_level()
    }

    fn set_compression_level(&mut self, level: Option<i32>) -> CompressionResult<()> {
        self.provider_mut().set_compression_level(level)
    }

    fn min_compression_level(&self) -> i32 {
        self.provider().min_compression_level()
    }

    fn max_compression_level(&self) -> i32 {
        self.provider().max_compression_level()
    }
}
