use flate2::{
    Compress, CompressError, Compression, Decompress, DecompressError, FlushCompress,
    FlushDecompress, Status,
};
use tracing::error;

use crate::compression::{
    CompressionError, CompressionMode, CompressionProvider, CompressionResult,
};

/// Size of the scratch buffer that engine output is drained through.
const BUFFER_SIZE: usize = 32_768;

/// Zlib (RFC 1950) compression of tile data.
///
/// Levels range from [`ZlibCompressor::BEST_SPEED`] to [`ZlibCompressor::BEST_COMPRESSION`].
/// [`ZlibCompressor::DEFAULT_LEVEL`] is accepted as an alias for the default level and is
/// stored as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZlibCompressor {
    level: Option<i32>,
}

impl ZlibCompressor {
    pub const BEST_SPEED: i32 = 1;
    pub const BEST_COMPRESSION: i32 = 9;
    pub const DEFAULT_LEVEL: i32 = -1;

    pub fn with_level(level: i32) -> CompressionResult<Self> {
        let mut compressor = Self::default();
        compressor.set_compression_level(Some(level))?;
        Ok(compressor)
    }

    fn compression(self) -> Compression {
        self.level
            .and_then(|level| u32::try_from(level).ok())
            .map_or_else(Compression::default, Compression::new)
    }
}

impl CompressionProvider for ZlibCompressor {
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        if data.is_empty() {
            return Err(CompressionError::NoData);
        }

        let mut stream = Compress::new(self.compression(), true);
        let mut result = Vec::with_capacity(data.len() / 2);
        if let Err(e) = drain_stream(&mut stream, data, &mut result, usize::MAX) {
            error!("Could not compress {} bytes of tile data: {e}", data.len());
            return Err(e);
        }
        Ok(result)
    }

    fn decompress_bounded(&self, data: &[u8], limit: usize) -> CompressionResult<Vec<u8>> {
        if data.is_empty() {
            return Err(CompressionError::NoData);
        }

        let mut stream = Decompress::new(true);
        let mut result = Vec::with_capacity(data.len().saturating_mul(4).min(limit));
        if let Err(e) = drain_stream(&mut stream, data, &mut result, limit) {
            error!(
                "Could not decompress {} bytes of tile data: {e}",
                data.len()
            );
            return Err(e);
        }
        Ok(result)
    }

    fn compression_level(&self) -> Option<i32> {
        self.level
    }

    fn set_compression_level(&mut self, level: Option<i32>) -> CompressionResult<()> {
        match level {
            None | Some(Self::DEFAULT_LEVEL) => self.level = None,
            Some(level) if (Self::BEST_SPEED..=Self::BEST_COMPRESSION).contains(&level) => {
                self.level = Some(level);
            }
            Some(level) => {
                return Err(CompressionError::InvalidLevel {
                    mode: CompressionMode::Zlib,
                    level,
                    min: Self::BEST_SPEED,
                    max: Self::BEST_COMPRESSION,
                });
            }
        }
        Ok(())
    }

    fn min_compression_level(&self) -> i32 {
        Self::BEST_SPEED
    }

    fn max_compression_level(&self) -> i32 {
        Self::BEST_COMPRESSION
    }
}

/// Common view of the flate2 deflate and inflate streams.
trait ZlibStream {
    fn total_in(&self) -> u64;
    fn total_out(&self) -> u64;
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> CompressionResult<Status>;
}

impl ZlibStream for Compress {
    fn total_in(&self) -> u64 {
        Self::total_in(self)
    }

    fn total_out(&self) -> u64 {
        Self::total_out(self)
    }

    fn step(&mut self, input: &[u8], output: &mut [u8]) -> CompressionResult<Status> {
        self.compress(input, output, FlushCompress::Finish)
            .map_err(|e: CompressError| CompressionError::internal(CompressionMode::Zlib, &e))
    }
}

impl ZlibStream for Decompress {
    fn total_in(&self) -> u64 {
        Self::total_in(self)
    }

    fn total_out(&self) -> u64 {
        Self::total_out(self)
    }

    fn step(&mut self, input: &[u8], output: &mut [u8]) -> CompressionResult<Status> {
        // Inflating with `Finish` requires the whole output to fit in one buffer
        self.decompress(input, output, FlushDecompress::None)
            .map_err(|e: DecompressError| CompressionError::internal(CompressionMode::Zlib, &e))
    }
}

/// Feeds `input` through `stream`, reusing a fixed-size output buffer and appending
/// everything written to it to `result` until the engine reports the end of the stream.
///
/// Stops with [`CompressionError::OutputTooLarge`] once `result` holds more than `limit`
/// bytes. Input left over after the end of the stream is an error.
fn drain_stream<S: ZlibStream>(
    stream: &mut S,
    input: &[u8],
    result: &mut Vec<u8>,
    limit: usize,
) -> CompressionResult<()> {
    let mut buffer = vec![0_u8; BUFFER_SIZE];
    let mut consumed = 0;

    loop {
        let (in_before, out_before) = (stream.total_in(), stream.total_out());
        let status = stream.step(&input[consumed..], &mut buffer)?;
        let read = progress(in_before, stream.total_in())?;
        let written = progress(out_before, stream.total_out())?;

        consumed += read;
        result.extend_from_slice(&buffer[..written]);
        if result.len() > limit {
            return Err(CompressionError::OutputTooLarge {
                mode: CompressionMode::Zlib,
                limit,
            });
        }

        match status {
            Status::StreamEnd if consumed < input.len() => {
                let trailing = input.len() - consumed;
                return Err(CompressionError::internal(
                    CompressionMode::Zlib,
                    &format!("{trailing} bytes after the end of the stream"),
                ));
            }
            Status::StreamEnd => return Ok(()),
            Status::Ok | Status::BufError if read > 0 || written > 0 => {}
            Status::Ok | Status::BufError => {
                return Err(CompressionError::internal(
                    CompressionMode::Zlib,
                    "stream ended unexpectedly",
                ));
            }
        }
    }
}

fn progress(before: u64, after: u64) -> CompressionResult<usize> {
    usize::try_from(after.saturating_sub(before))
        .map_err(|e| CompressionError::internal(CompressionMode::Zlib, &e))
}
