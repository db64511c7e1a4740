use std::io::{self, Read as _, Write as _};

use tracing::error;
use zstd::stream::read::Decoder;
use zstd::stream::write::Encoder;

use crate::compression::{
    CompressionError, CompressionMode, CompressionProvider, CompressionResult,
};

/// Zstandard compression of tile data, producing standard zstd frames.
///
/// The level bounds are queried from the linked zstd library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZstdCompressor {
    level: Option<i32>,
}

impl ZstdCompressor {
    pub fn with_level(level: i32) -> CompressionResult<Self> {
        let mut compressor = Self::default();
        compressor.set_compression_level(Some(level))?;
        Ok(compressor)
    }

    #[must_use]
    pub fn min_level() -> i32 {
        *zstd::compression_level_range().start()
    }

    #[must_use]
    pub fn max_level() -> i32 {
        *zstd::compression_level_range().end()
    }

    fn encode(self, data: &[u8]) -> io::Result<Vec<u8>> {
        let level = self.level.unwrap_or(zstd::DEFAULT_COMPRESSION_LEVEL);
        let mut encoder = Encoder::new(Vec::with_capacity(data.len() / 2), level)?;
        encoder.write_all(data)?;
        encoder.finish()
    }

    /// Decodes at most one byte more than `limit`, so callers can tell the output was cut.
    fn decode(data: &[u8], limit: usize) -> io::Result<Vec<u8>> {
        let max_read = u64::try_from(limit).unwrap_or(u64::MAX);
        let mut decoder = Decoder::new(data)?.take(max_read.saturating_add(1));
        let mut result = Vec::with_capacity(data.len().saturating_mul(4).min(limit));
        decoder.read_to_end(&mut result)?;
        Ok(result)
    }
}

impl CompressionProvider for ZstdCompressor {
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        if data.is_empty() {
            return Err(CompressionError::NoData);
        }

        self.encode(data).map_err(|e| {
            error!("Could not compress {} bytes of tile data: {e}", data.len());
            CompressionError::internal(CompressionMode::Zstd, &e)
        })
    }

    fn decompress_bounded(&self, data: &[u8], limit: usize) -> CompressionResult<Vec<u8>> {
        if data.is_empty() {
            return Err(CompressionError::NoData);
        }

        let result = Self::decode(data, limit).map_err(|e| {
            error!(
                "Could not decompress {} bytes of tile data: {e}",
                data.len()
            );
            CompressionError::internal(CompressionMode::Zstd, &e)
        })?;
        if result.len() > limit {
            error!(
                "Could not decompress {} bytes of tile data: output exceeds {limit} bytes",
                data.len()
            );
            return Err(CompressionError::OutputTooLarge {
                mode: CompressionMode::Zstd,
                limit,
            });
        }
        Ok(result)
    }

    fn compression_level(&self) -> Option<i32> {
        self.level
    }

    fn set_compression_level(&mut self, level: Option<i32>) -> CompressionResult<()> {
        if let Some(level) = level
            && !zstd::compression_level_range().contains(&level)
        {
            return Err(CompressionError::InvalidLevel {
                mode: CompressionMode::Zstd,
                level,
                min: Self::min_level(),
                max: Self::max_level(),
            });
        }
        self.level = level;
        Ok(())
    }

    fn min_compression_level(&self) -> i32 {
        Self::min_level()
    }

    fn max_compression_level(&self) -> i32 {
        Self::max_level()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 13) as u8 * 17).collect()
    }

    #[rstest]
    #[case::tiny(1)]
    #[case::small(100)]
    #[case::large(300_000)]
    fn roundtrip(#[case] len: usize) {
        let data = sample(len);
        let provider = ZstdCompressor::default();
        let compressed = provider.compress(&data).unwrap();
        assert_eq!(provider.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn empty_input_is_rejected() {
        let provider = ZstdCompressor::default();
        assert!(matches!(
            provider.compress(&[]),
            Err(CompressionError::NoData)
        ));
        assert!(matches!(
            provider.decompress(&[]),
            Err(CompressionError::NoData)
        ));
    }

    #[test]
    fn output_is_standard_zstd() {
        let data = sample(5000);
        let compressed = ZstdCompressor::with_level(19)
            .unwrap()
            .compress(&data)
            .unwrap();
        assert_eq!(&compressed[..4], &[0x28, 0xB5, 0x2F, 0xFD]);
        assert_eq!(zstd::decode_all(compressed.as_slice()).unwrap(), data);
    }

    #[test]
    fn reads_foreign_zstd() {
        let data = sample(70_000);
        let compressed = zstd::encode_all(data.as_slice(), 1).unwrap();
        assert_eq!(
            ZstdCompressor::default().decompress(&compressed).unwrap(),
            data
        );
    }

    #[test]
    fn garbage_is_internal_error() {
        let err = ZstdCompressor::default()
            .decompress(b"definitely not zstd")
            .unwrap_err();
        assert!(matches!(
            err,
            CompressionError::InternalError {
                mode: CompressionMode::Zstd,
                ..
            }
        ));
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let provider = ZstdCompressor::default();
        let compressed = provider.compress(&sample(4096)).unwrap();
        let truncated = &compressed[..compressed.len() - 3];
        assert!(provider.decompress(truncated).is_err());
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let provider = ZstdCompressor::default();
        let mut compressed = provider.compress(&sample(48)).unwrap();
        compressed.extend_from_slice(b"garbage trailing");
        assert!(provider.decompress(&compressed).is_err());
    }

    #[test]
    fn output_is_bounded() {
        let provider = ZstdCompressor::default();
        let zeros = vec![0_u8; 4 * 1024 * 1024];
        let compressed = provider.compress(&zeros).unwrap();
        assert!(compressed.len() < 8 * 1024);

        let err = provider.decompress_bounded(&compressed, 4).unwrap_err();
        assert!(matches!(
            err,
            CompressionError::OutputTooLarge {
                mode: CompressionMode::Zstd,
                limit: 4,
            }
        ));

        let exact = provider
            .decompress_bounded(&compressed, zeros.len())
            .unwrap();
        assert_eq!(exact.len(), zeros.len());
        let short = provider.decompress_bounded(&compressed, zeros.len() - 1);
        assert!(short.is_err());
    }

    #[test]
    fn level_bounds_come_from_library() {
        let provider = ZstdCompressor::default();
        let range = zstd::compression_level_range();
        assert_eq!(provider.min_compression_level(), *range.start());
        assert_eq!(provider.max_compression_level(), *range.end());
        assert!(provider.max_compression_level() >= 19);
    }

    #[test]
    fn levels() {
        let mut provider = ZstdCompressor::default();
        assert_eq!(provider.compression_level(), None);

        provider.set_compression_level(Some(12)).unwrap();
        assert_eq!(provider.compression_level(), Some(12));

        let too_high = ZstdCompressor::max_level() + 1;
        assert!(matches!(
            provider.set_compression_level(Some(too_high)),
            Err(CompressionError::InvalidLevel { level, .. }) if level == too_high
        ));
        let too_low = ZstdCompressor::min_level() - 1;
        assert!(provider.set_compression_level(Some(too_low)).is_err());
        assert_eq!(provider.compression_level(), Some(12));

        provider.set_compression_level(None).unwrap();
        assert_eq!(provider.compression_level(), None);
    }
}
