//! Uncompressed textual tile data, as written by map editors into XML and YAML save files.

use tracing::debug;

use crate::{
    MatrixExtent, TileCodecError, TileCodecResult, TileEncodingFormat, TileId, TileMatrix,
};

/// Separator written between tiles of plain-text tile data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlainTextDelimiter {
    /// `1,2,3,` lines, where every row but the last keeps a trailing comma.
    #[default]
    Comma,
    /// `1 2 3` lines.
    Space,
}

/// Writes `matrix` as text, one line per row.
#[must_use]
pub fn tile_matrix_to_plain_text(matrix: &TileMatrix, delimiter: PlainTextDelimiter) -> String {
    let separator = match delimiter {
        PlainTextDelimiter::Comma => ',',
        PlainTextDelimiter::Space => ' ',
    };

    let mut text = String::new();
    for (index, row) in matrix.rows().enumerate() {
        if index > 0 {
            if delimiter == PlainTextDelimiter::Comma {
                text.push(',');
            }
            text.push('\n');
        }
        for (col, tile) in row.iter().enumerate() {
            if col > 0 {
                text.push(separator);
            }
            text.push_str(&tile.to_string());
        }
    }
    text
}

/// Parses plain-text tile data into a matrix of `extent`.
///
/// Tiles may be separated by commas, whitespace or both, and line breaks are not
/// required to match rows.
pub fn tile_matrix_from_plain_text(
    text: &str,
    extent: MatrixExtent,
    format: TileEncodingFormat,
) -> TileCodecResult<TileMatrix> {
    let expected = extent
        .tile_count()
        .ok_or(TileCodecError::ExtentTooLarge(extent))?;

    let tiles = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| {
            token
                .parse::<u32>()
                .map(|value| format.normalize(TileId::new(value)))
                .map_err(|_| TileCodecError::InvalidPlainTile {
                    index,
                    token: token.to_string(),
                })
        })
        .collect::<TileCodecResult<Vec<_>>>()?;

    if tiles.len() != expected {
        debug!(
            "Plain-text tile data has {} tiles, expected {expected} for a {extent} matrix",
            tiles.len()
        );
    }
    TileMatrix::from_tiles(extent, tiles)
}
