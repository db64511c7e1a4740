//! Tile identifiers and the reserved flag bits used by the Tiled format family.
//!
//! A tile identifier is a plain 32-bit value where `0` means "no tile". Tiled stores
//! flip and rotation state in the four most significant bits, so those bits are never
//! part of the identifier payload. Maps written by this crate never set them.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Reserved high bits of a [`TileId`].
///
/// ```
/// # use tile_codec::{TileFlags, TileId};
/// let id = TileId::new(7).with_flags(TileFlags::FLIPPED_HORIZONTALLY);
/// assert!(id.is_flipped_horizontally());
/// assert_eq!(id.strip_flags(), TileId::new(7));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileFlags(u32);

impl TileFlags {
    pub const NONE: Self = Self(0);
    pub const FLIPPED_HORIZONTALLY: Self = Self(0x8000_0000);
    pub const FLIPPED_VERTICALLY: Self = Self(0x4000_0000);
    pub const FLIPPED_DIAGONALLY: Self = Self(0x2000_0000);
    /// Only meaningful for hexagonal maps.
    pub const ROTATED_HEXAGONAL_120: Self = Self(0x1000_0000);
    pub const ALL: Self = Self(0xF000_0000);

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Keeps only the reserved bits of `bits`.
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TileFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Identifier of a single tile in a tile layer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(u32);

impl TileId {
    /// The identifier of a cell with no tile in it.
    pub const EMPTY: Self = Self(0);

    /// Mask of the bits that carry the actual identifier.
    pub const PAYLOAD_MASK: u32 = !TileFlags::ALL.bits();

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }

    #[must_use]
    pub const fn flags(self) -> TileFlags {
        TileFlags::from_bits_truncate(self.0)
    }

    #[must_use]
    pub const fn is_flipped_horizontally(self) -> bool {
        self.flags().contains(TileFlags::FLIPPED_HORIZONTALLY)
    }

    #[must_use]
    pub const fn is_flipped_vertically(self) -> bool {
        self.flags().contains(TileFlags::FLIPPED_VERTICALLY)
    }

    #[must_use]
    pub const fn is_flipped_diagonally(self) -> bool {
        self.flags().contains(TileFlags::FLIPPED_DIAGONALLY)
    }

    #[must_use]
    pub const fn is_rotated_hexagonal_120(self) -> bool {
        self.flags().contains(TileFlags::ROTATED_HEXAGONAL_120)
    }

    /// Returns the identifier with all reserved flag bits cleared.
    #[must_use]
    pub const fn strip_flags(self) -> Self {
        Self(self.0 & Self::PAYLOAD_MASK)
    }

    #[must_use]
    pub const fn with_flags(self, flags: TileFlags) -> Self {
        Self(self.0 | flags.bits())
    }
}

impl From<u32> for TileId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<TileId> for u32 {
    fn from(id: TileId) -> Self {
        id.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
