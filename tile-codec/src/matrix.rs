//! Rectangular, row-major tile matrices.

use std::fmt;
use std::mem;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::TileId;
use crate::error::{TileCodecError, TileCodecResult};

/// Size of a single encoded tile in a byte stream.
pub const BYTES_PER_TILE: usize = size_of::<u32>();

/// Number of rows and columns of a tile matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixExtent {
    pub rows: usize,
    pub cols: usize,
}

impl MatrixExtent {
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of tiles, or `None` if it does not fit in `usize`.
    #[must_use]
    pub const fn tile_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Length of the byte stream of a matrix with this extent.
    #[must_use]
    pub fn byte_len(&self) -> Option<usize> {
        self.tile_count()?.checked_mul(BYTES_PER_TILE)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    #[must_use]
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Converts a 2D position into a row-major index.
    #[must_use]
    pub const fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if self.contains(row, col) {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Converts a row-major index into a `(row, col)` position.
    #[must_use]
    pub const fn position_of(&self, index: usize) -> Option<(usize, usize)> {
        if self.cols == 0 {
            return None;
        }
        let position = (index / self.cols, index % self.cols);
        if position.0 < self.rows {
            Some(position)
        } else {
            None
        }
    }
}

impl fmt::Display for MatrixExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A rectangular grid of tile identifiers, stored row by row.
///
/// The tile storage always holds exactly `rows * cols` tiles, so every row has the
/// same length. Serialized as an array of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<TileId>>", into = "Vec<Vec<TileId>>")]
pub struct TileMatrix {
    extent: MatrixExtent,
    tiles: Vec<TileId>,
}

impl TileMatrix {
    /// Creates a matrix of the given extent filled with [`TileId::EMPTY`].
    pub fn new(extent: MatrixExtent) -> TileCodecResult<Self> {
        let count = extent
            .tile_count()
            .ok_or(TileCodecError::ExtentTooLarge(extent))?;
        Ok(Self {
            extent,
            tiles: vec![TileId::EMPTY; count],
        })
    }

    /// Wraps row-major `tiles`, which must contain exactly one tile per cell.
    pub fn from_tiles(extent: MatrixExtent, tiles: Vec<TileId>) -> TileCodecResult<Self> {
        let expected = extent
            .tile_count()
            .ok_or(TileCodecError::ExtentTooLarge(extent))?;
        if tiles.len() != expected {
            return Err(TileCodecError::TileCountMismatch {
                extent,
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self { extent, tiles })
    }

    /// Builds a matrix from nested rows, rejecting rows of unequal length.
    ///
    /// An empty list of rows produces a `0x0` matrix.
    pub fn from_rows(rows: Vec<Vec<TileId>>) -> TileCodecResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let extent = MatrixExtent::new(rows.len(), cols);
        let mut tiles = Vec::with_capacity(extent.tile_count().unwrap_or_default());
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != cols {
                return Err(TileCodecError::RaggedMatrix {
                    row,
                    expected: cols,
                    actual: values.len(),
                });
            }
            tiles.extend(values);
        }
        Ok(Self { extent, tiles })
    }

    #[must_use]
    pub fn extent(&self) -> MatrixExtent {
        self.extent
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<TileId> {
        self.extent
            .index_of(row, col)
            .map(|index| self.tiles[index])
    }

    /// Replaces the tile at `(row, col)`, returning the previous one.
    ///
    /// Returns `None` and leaves the matrix untouched if the position is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, id: TileId) -> Option<TileId> {
        let index = self.extent.index_of(row, col)?;
        Some(mem::replace(&mut self.tiles[index], id))
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TileId]> {
        // `chunks_exact` rejects a zero chunk size, and a matrix without columns has no tiles
        self.tiles.chunks_exact(self.extent.cols.max(1))
    }
}

impl Index<(usize, usize)> for TileMatrix {
    type Output = TileId;

    fn index(&self, (row, col): (usize, usize)) -> &TileId {
        assert!(
            self.extent.contains(row, col),
            "tile position ({row}, {col}) is outside of a {} matrix",
            self.extent
        );
        &self.tiles[row * self.extent.cols + col]
    }
}

impl TryFrom<Vec<Vec<TileId>>> for TileMatrix {
    type Error = TileCodecError;

    fn try_from(rows: Vec<Vec<TileId>>) -> TileCodecResult<Self> {
        Self::from_rows(rows)
    }
}

impl From<TileMatrix> for Vec<Vec<TileId>> {
    fn from(matrix: TileMatrix) -> Self {
        matrix.rows().map(<[TileId]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn ids(values: &[u32]) -> Vec<TileId> {
        values.iter().copied().map(TileId::new).collect()
    }

    #[test]
    fn new_matrix_is_empty_tiles() {
        let matrix = TileMatrix::new(MatrixExtent::new(2, 3)).unwrap();
        assert_eq!(matrix.extent(), MatrixExtent::new(2, 3));
        assert_eq!(matrix.tiles().len(), 6);
        assert!(matrix.tiles().iter().all(|id| id.is_empty()));
    }

    #[test]
    fn from_rows_keeps_order() {
        let matrix = TileMatrix::from_rows(vec![ids(&[1, 2, 3]), ids(&[4, 5, 6])]).unwrap();
        assert_eq!(matrix.extent(), MatrixExtent::new(2, 3));
        assert_eq!(matrix.tiles(), ids(&[1, 2, 3, 4, 5, 6]).as_slice());
        assert_eq!(matrix[(1, 0)], TileId::new(4));
        assert_eq!(matrix.get(0, 2), Some(TileId::new(3)));
        assert_eq!(matrix.get(2, 0), None);
        assert_eq!(matrix.get(0, 3), None);
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = TileMatrix::from_rows(vec![ids(&[1, 2]), ids(&[3])]).unwrap_err();
        assert!(matches!(
            err,
            TileCodecError::RaggedMatrix {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn from_tiles_checks_count() {
        let extent = MatrixExtent::new(2, 2);
        assert!(TileMatrix::from_tiles(extent, ids(&[1, 2, 3, 4])).is_ok());
        assert!(matches!(
            TileMatrix::from_tiles(extent, ids(&[1, 2, 3])),
            Err(TileCodecError::TileCountMismatch {
                expected: 4,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn set_replaces_tile() {
        let mut matrix = TileMatrix::new(MatrixExtent::new(2, 2)).unwrap();
        assert_eq!(matrix.set(1, 1, TileId::new(9)), Some(TileId::EMPTY));
        assert_eq!(matrix.set(2, 1, TileId::new(9)), None);
        assert_eq!(matrix[(1, 1)], TileId::new(9));
    }

    #[test]
    fn rows_of_matrix_without_columns() {
        let matrix = TileMatrix::new(MatrixExtent::new(3, 0)).unwrap();
        assert_eq!(matrix.rows().count(), 0);
        assert!(matrix.is_empty());
    }

    #[rstest]
    #[case(MatrixExtent::new(2, 3), 0, Some((0, 0)))]
    #[case(MatrixExtent::new(2, 3), 4, Some((1, 1)))]
    #[case(MatrixExtent::new(2, 3), 5, Some((1, 2)))]
    #[case(MatrixExtent::new(2, 3), 6, None)]
    #[case(MatrixExtent::new(2, 0), 0, None)]
    fn position_of_index(
        #[case] extent: MatrixExtent,
        #[case] index: usize,
        #[case] expected: Option<(usize, usize)>,
    ) {
        assert_eq!(extent.position_of(index), expected);
    }

    #[test]
    fn byte_len_overflow() {
        assert_eq!(MatrixExtent::new(3, 4).byte_len(), Some(48));
        assert_eq!(MatrixExtent::new(usize::MAX, 2).byte_len(), None);
        assert_eq!(MatrixExtent::new(usize::MAX / 2, 1).byte_len(), None);
    }

    #[test]
    fn serde_as_nested_rows() {
        let matrix: TileMatrix = serde_json::from_str("[[1, 2], [3, 4]]").unwrap();
        assert_eq!(matrix.extent(), MatrixExtent::new(2, 2));
        assert_eq!(serde_json::to_string(&matrix).unwrap(), "[[1,2],[3,4]]");
        assert!(serde_json::from_str::<TileMatrix>("[[1, 2], [3]]").is_err());
    }
}
