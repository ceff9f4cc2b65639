/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Logical geometry relative to the block formatting context that contains the floats.
//!
//! Offsets are flow-relative: the line offset runs along the inline axis and the block offset
//! runs along the block axis, growing in the direction content flows. `MIN_AU` and `MAX_AU`
//! stand in for negative and positive infinity.

use std::fmt;

use app_units::{Au, MAX_AU};
use euclid::num::Zero;

/// A two dimensional logical vector, used for sizes in this crate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LogicalVec2<T> {
    pub inline: T,
    pub block: T,
}

impl<T: Copy> LogicalVec2<T> {
    pub fn new(inline: T, block: T) -> Self {
        LogicalVec2 { inline, block }
    }
}

impl<T: Zero> LogicalVec2<T> {
    pub fn zero() -> Self {
        LogicalVec2 {
            inline: T::zero(),
            block: T::zero(),
        }
    }
}

/// A position in the block formatting context.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct BfcOffset {
    pub line_offset: Au,
    pub block_offset: Au,
}

impl BfcOffset {
    pub fn new(line_offset: Au, block_offset: Au) -> Self {
        BfcOffset {
            line_offset,
            block_offset,
        }
    }

    pub fn zero() -> Self {
        BfcOffset::new(Au::zero(), Au::zero())
    }
}

impl fmt::Debug for BfcOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.line_offset, self.block_offset)
    }
}

/// An axis-aligned rectangle in the block formatting context, described by its start and end
/// corners.
///
/// A block end of `MAX_AU` means the rectangle is unbounded in the block direction.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct BfcRect {
    pub start_offset: BfcOffset,
    pub end_offset: BfcOffset,
}

impl BfcRect {
    pub fn new(start_offset: BfcOffset, end_offset: BfcOffset) -> Self {
        debug_assert!(start_offset.line_offset <= end_offset.line_offset);
        debug_assert!(start_offset.block_offset <= end_offset.block_offset);
        BfcRect {
            start_offset,
            end_offset,
        }
    }

    #[inline]
    pub fn line_start_offset(&self) -> Au {
        self.start_offset.line_offset
    }

    #[inline]
    pub fn line_end_offset(&self) -> Au {
        self.end_offset.line_offset
    }

    #[inline]
    pub fn block_start_offset(&self) -> Au {
        self.start_offset.block_offset
    }

    #[inline]
    pub fn block_end_offset(&self) -> Au {
        self.end_offset.block_offset
    }

    pub fn inline_size(&self) -> Au {
        self.line_end_offset() - self.line_start_offset()
    }

    /// The block size of this rectangle. An unbounded rectangle reports `MAX_AU`, which callers
    /// should treat as infinity.
    pub fn block_size(&self) -> Au {
        if self.block_end_offset() == MAX_AU {
            return MAX_AU;
        }
        self.block_end_offset() - self.block_start_offset()
    }

    /// Whether this rectangle covers no area at all.
    pub fn is_empty(&self) -> bool {
        self.line_start_offset() == self.line_end_offset() ||
            self.block_start_offset() == self.block_end_offset()
    }

    /// Whether the interiors of the two rectangles overlap. Rectangles that only share an edge
    /// do not intersect, and an empty rectangle has no interior to share.
    pub fn intersects(&self, other: &BfcRect) -> bool {
        !self.is_empty() &&
            !other.is_empty() &&
            self.line_start_offset() < other.line_end_offset() &&
            other.line_start_offset() < self.line_end_offset() &&
            self.block_start_offset() < other.block_end_offset() &&
            other.block_start_offset() < self.block_end_offset()
    }
}

impl fmt::Debug for BfcRect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rect({:?} - {:?})", self.start_offset, self.end_offset)
    }
}

#[cfg(test)]
mod tests {
    use app_units::{Au, MAX_AU};

    use super::{BfcOffset, BfcRect};

    fn rect(line: (i32, i32), block: (i32, i32)) -> BfcRect {
        BfcRect::new(
            BfcOffset::new(Au::from_px(line.0), Au::from_px(block.0)),
            BfcOffset::new(Au::from_px(line.1), Au::from_px(block.1)),
        )
    }

    #[test]
    fn test_sizes() {
        let r = rect((10, 40), (5, 25));
        assert_eq!(r.inline_size(), Au::from_px(30));
        assert_eq!(r.block_size(), Au::from_px(20));
        assert!(!r.is_empty());
        assert!(rect((10, 10), (0, 5)).is_empty());
        assert!(rect((0, 10), (5, 5)).is_empty());
    }

    #[test]
    fn test_unbounded_block_size() {
        let r = BfcRect::new(
            BfcOffset::new(Au::from_px(0), Au::from_px(100)),
            BfcOffset::new(Au::from_px(50), MAX_AU),
        );
        assert_eq!(r.block_size(), MAX_AU);
    }

    #[test]
    fn test_intersects_ignores_shared_edges() {
        let a = rect((0, 10), (0, 10));
        assert!(a.intersects(&rect((5, 15), (5, 15))));
        assert!(!a.intersects(&rect((10, 20), (0, 10))));
        assert!(!a.intersects(&rect((0, 10), (10, 20))));
    }

    #[test]
    fn test_empty_rect_never_intersects() {
        let a = rect((0, 100), (0, 100));
        let zero_width = rect((15, 15), (0, 100));
        let zero_height = rect((0, 100), (50, 50));
        assert!(!a.intersects(&zero_width));
        assert!(!zero_width.intersects(&a));
        assert!(!a.intersects(&zero_height));
        assert!(!zero_height.intersects(&zero_width));
    }
}
