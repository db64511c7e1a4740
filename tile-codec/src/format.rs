//! Per-map tile format settings, as stored alongside the map or passed on the command line.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{base64_decode_tile_matrix_with, base64_encode_tile_matrix_with};
use crate::compression::{CompressionMode, CompressionProvider as _, Compressor};
use crate::plain_text::{
    PlainTextDelimiter, tile_matrix_from_plain_text, tile_matrix_to_plain_text,
};
use crate::{MatrixExtent, TileCodecError, TileCodecResult, TileEncodingFormat, TileMatrix};

/// How tile data is represented as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileEncoding {
    /// Delimited decimal identifiers, never compressed.
    PlainText,
    /// Little-endian byte stream, optionally compressed, in Base64.
    #[default]
    Base64,
}

impl FromStr for TileEncoding {
    type Err = TileCodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" | "plain" | "plain-text" => Ok(Self::PlainText),
            "base64" => Ok(Self::Base64),
            _ => Err(TileCodecError::UnknownEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for TileEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlainText => "plain-text",
            Self::Base64 => "base64",
        })
    }
}

/// Encoding and compression settings of the tile layers in a map.
///
/// ```
/// # use tile_codec::{CompressionMode, TileEncoding, TileFormat};
/// let format: TileFormat = serde_yaml::from_str("compression: zstd\nzstd-compression-level: 9").unwrap();
/// assert_eq!(format.encoding, TileEncoding::Base64);
/// assert_eq!(format.compression, CompressionMode::Zstd);
/// assert_eq!(format.zstd_compression_level, Some(9));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TileFormat {
    pub encoding: TileEncoding,
    pub compression: CompressionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zlib_compression_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zstd_compression_level: Option<i32>,
}

impl TileFormat {
    /// Level configured for the selected compression mode.
    #[must_use]
    pub fn compression_level(&self) -> Option<i32> {
        match self.compression {
            CompressionMode::None => None,
            CompressionMode::Zlib => self.zlib_compression_level,
            CompressionMode::Zstd => self.zstd_compression_level,
        }
    }

    /// Checks that the settings can be used to encode tile data.
    pub fn validate(&self) -> TileCodecResult<()> {
        if self.encoding == TileEncoding::PlainText && self.compression.is_compressed() {
            return Err(TileCodecError::PlainEncodingWithCompression);
        }
        self.compressor().map(|_| ())
    }

    /// Creates the provider for the selected compression mode with the configured level.
    pub fn compressor(&self) -> TileCodecResult<Compressor> {
        let mut compressor = self.compression.compressor();
        compressor.set_compression_level(self.compression_level())?;
        Ok(compressor)
    }

    pub fn encode(
        &self,
        matrix: &TileMatrix,
        delimiter: PlainTextDelimiter,
    ) -> TileCodecResult<String> {
        self.validate()?;
        match self.encoding {
            TileEncoding::PlainText => Ok(tile_matrix_to_plain_text(matrix, delimiter)),
            TileEncoding::Base64 => {
                Ok(base64_encode_tile_matrix_with(matrix, &self.compressor()?)?)
            }
        }
    }

    /// Decodes tile data of a layer with the given `extent`.
    ///
    /// Surrounding whitespace of Base64 data is ignored.
    pub fn decode(
        &self,
        text: &str,
        extent: MatrixExtent,
        format: TileEncodingFormat,
    ) -> TileCodecResult<TileMatrix> {
        self.validate()?;
        debug!("Decoding {extent} tile layer stored as {self}");
        match self.encoding {
            TileEncoding::PlainText => tile_matrix_from_plain_text(text, extent, format),
            TileEncoding::Base64 => {
                base64_decode_tile_matrix_with(text.trim(), extent, &self.compressor()?, format)
            }
        }
    }
}

impl fmt::Display for TileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encoding)?;
        if self.compression.is_compressed() {
            write!(f, " with {} compression", self.compression)?;
            if let Some(level) = self.compression_level() {
                write!(f, " (level {level})")?;
            }
        }
        Ok(())
    }
}
