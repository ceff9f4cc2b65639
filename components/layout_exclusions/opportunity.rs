/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Layout opportunities: free rectangles where content can be placed next to floats.

use std::iter::Peekable;
use std::slice;

use app_units::{Au, MAX_AU};

use crate::geom::{BfcOffset, BfcRect};
use crate::shelf::Shelf;

/// A maximal rectangle which does not overlap any float.
///
/// Opportunities that come from a shelf are unbounded in the block direction; their block end
/// is `MAX_AU`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LayoutOpportunity {
    pub rect: BfcRect,
}

impl LayoutOpportunity {
    pub(crate) fn new(rect: BfcRect) -> Self {
        LayoutOpportunity { rect }
    }

    #[inline]
    pub fn inline_size(&self) -> Au {
        self.rect.inline_size()
    }

    /// The block size of this opportunity, or `MAX_AU` when it is unbounded.
    #[inline]
    pub fn block_size(&self) -> Au {
        self.rect.block_size()
    }

    /// Whether this opportunity extends infinitely in the block direction.
    pub fn is_unbounded(&self) -> bool {
        self.rect.block_end_offset() == MAX_AU
    }

    /// Whether this (closed) opportunity shares any space with the search area starting at
    /// `origin` that is `inline_size` wide and extends infinitely downwards.
    fn intersects(&self, origin: &BfcOffset, inline_size: Au) -> bool {
        intersects_inline(
            self.rect.line_start_offset(),
            self.rect.line_end_offset(),
            origin,
            inline_size,
        ) && self.rect.block_end_offset() > origin.block_offset
    }

    /// Clips this opportunity to the search area. It must intersect with it.
    fn clip(&self, origin: &BfcOffset, inline_size: Au) -> LayoutOpportunity {
        debug_assert!(self.intersects(origin, inline_size));
        let start_offset = BfcOffset::new(
            self.rect.line_start_offset().max(origin.line_offset),
            self.rect.block_start_offset().max(origin.block_offset),
        );
        let end_offset = BfcOffset::new(
            self.rect
                .line_end_offset()
                .min(origin.line_offset + inline_size),
            self.rect.block_end_offset(),
        );
        LayoutOpportunity::new(BfcRect::new(start_offset, end_offset))
    }

    /// The unbounded opportunity below `shelf`, clipped to the search area.
    fn from_shelf(shelf: &Shelf, origin: &BfcOffset, inline_size: Au) -> LayoutOpportunity {
        let start_offset = BfcOffset::new(
            shelf.line_left.max(origin.line_offset),
            shelf.block_offset.max(origin.block_offset),
        );
        // Never end before the start, in case the shelf lies outside the search area.
        let end_offset = BfcOffset::new(
            shelf
                .line_right
                .min(origin.line_offset + inline_size)
                .max(start_offset.line_offset),
            MAX_AU,
        );
        LayoutOpportunity::new(BfcRect::new(start_offset, end_offset))
    }
}

/// Where a search for a layout opportunity starts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchOrigin {
    /// Look for opportunities at or below `block_offset` within the inline range that starts
    /// at `line_offset`.
    At(BfcOffset),
    /// Placement without any inline constraint, e.g. for content that only needs to clear
    /// floats. The result always comes from the last shelf and has no inline size.
    Unconstrained { block_offset: Au },
}

impl From<BfcOffset> for SearchOrigin {
    fn from(offset: BfcOffset) -> Self {
        SearchOrigin::At(offset)
    }
}

/// Whether the inline range `[line_start, line_end)` shares space with the search area
/// `[origin.line_offset, origin.line_offset + inline_size)`.
fn intersects_inline(line_start: Au, line_end: Au, origin: &BfcOffset, inline_size: Au) -> bool {
    line_end > origin.line_offset && line_start < origin.line_offset + inline_size
}

/// An iterator over the layout opportunities of an exclusion space at or below an origin, in
/// block-start order.
///
/// This merges the closed opportunities recorded while floats were added with the open ones
/// described by the shelves, which are both kept sorted by block offset.
pub struct LayoutOpportunities<'a> {
    origin: BfcOffset,
    inline_size: Au,
    opportunities: Peekable<slice::Iter<'a, LayoutOpportunity>>,
    shelves: Peekable<slice::Iter<'a, Shelf>>,
}

impl<'a> LayoutOpportunities<'a> {
    pub(crate) fn new(
        opportunities: &'a [LayoutOpportunity],
        shelves: &'a [Shelf],
        origin: BfcOffset,
        inline_size: Au,
    ) -> Self {
        LayoutOpportunities {
            origin,
            inline_size,
            opportunities: opportunities.iter().peekable(),
            shelves: shelves.iter().peekable(),
        }
    }

    /// Skips closed opportunities that lie outside the search area and returns the next one.
    fn next_opportunity(&mut self) -> Option<&'a LayoutOpportunity> {
        let (origin, inline_size) = (self.origin, self.inline_size);
        while self
            .opportunities
            .next_if(|opportunity| !opportunity.intersects(&origin, inline_size))
            .is_some()
        {}
        self.opportunities.peek().copied()
    }

    /// Skips shelves that lie outside the inline range of the search area and returns the next
    /// one.
    fn next_shelf(&mut self) -> Option<&'a Shelf> {
        let (origin, inline_size) = (self.origin, self.inline_size);
        while self
            .shelves
            .next_if(|shelf| {
                !intersects_inline(shelf.line_left, shelf.line_right, &origin, inline_size)
            })
            .is_some()
        {}
        self.shelves.peek().copied()
    }

    /// Consumes the next shelf, returning its opportunity if the floats at its edges are still
    /// present below the origin.
    fn take_shelf(&mut self) -> Option<LayoutOpportunity> {
        let shelf = self.shelves.next()?;
        shelf
            .has_solid_edges(self.origin.block_offset, MAX_AU)
            .then(|| LayoutOpportunity::from_shelf(shelf, &self.origin, self.inline_size))
    }
}

impl Iterator for LayoutOpportunities<'_> {
    type Item = LayoutOpportunity;

    fn next(&mut self) -> Option<LayoutOpportunity> {
        loop {
            match (self.next_opportunity(), self.next_shelf()) {
                (Some(opportunity), Some(shelf))
                    if opportunity.rect.block_start_offset() > shelf.block_offset =>
                {
                    if let Some(opportunity) = self.take_shelf() {
                        return Some(opportunity);
                    }
                },
                (Some(opportunity), _) => {
                    self.opportunities.next();
                    return Some(opportunity.clip(&self.origin, self.inline_size));
                },
                (None, Some(_)) => {
                    if let Some(opportunity) = self.take_shelf() {
                        return Some(opportunity);
                    }
                },
                (None, None) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use app_units::{Au, MAX_AU, MIN_AU};

    use super::LayoutOpportunity;
    use crate::geom::{BfcOffset, BfcRect};
    use crate::shelf::Shelf;

    fn px(value: i32) -> Au {
        Au::from_px(value)
    }

    #[test]
    fn test_clip_to_search_area() {
        let opportunity = LayoutOpportunity::new(BfcRect::new(
            BfcOffset::new(MIN_AU, MIN_AU),
            BfcOffset::new(px(40), px(10)),
        ));
        let origin = BfcOffset::new(px(0), px(5));
        let clipped = opportunity.clip(&origin, px(100));
        assert_eq!(
            clipped.rect,
            BfcRect::new(BfcOffset::new(px(0), px(5)), BfcOffset::new(px(40), px(10)))
        );
    }

    #[test]
    fn test_closed_opportunity_above_origin_does_not_intersect() {
        let opportunity = LayoutOpportunity::new(BfcRect::new(
            BfcOffset::new(px(0), px(0)),
            BfcOffset::new(px(40), px(10)),
        ));
        assert!(opportunity.intersects(&BfcOffset::new(px(0), px(9)), px(100)));
        assert!(!opportunity.intersects(&BfcOffset::new(px(0), px(10)), px(100)));
        assert!(!opportunity.intersects(&BfcOffset::new(px(40), px(0)), px(100)));
    }

    #[test]
    fn test_from_shelf_is_unbounded() {
        let mut shelf = Shelf::new(px(20));
        shelf.line_left = px(10);
        let opportunity = LayoutOpportunity::from_shelf(&shelf, &BfcOffset::zero(), px(50));
        assert!(opportunity.is_unbounded());
        assert_eq!(opportunity.block_size(), MAX_AU);
        assert_eq!(opportunity.inline_size(), px(40));
        assert_eq!(opportunity.rect.start_offset, BfcOffset::new(px(10), px(20)));
    }
}
