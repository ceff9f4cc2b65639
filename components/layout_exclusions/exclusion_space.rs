/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The exclusion space of a block formatting context.
//!
//! The space is kept as a list of "shelves", sorted by block offset. Each shelf describes the
//! inline range that is free of floats from its block offset downwards. Areas that get closed
//! off by a float below a shelf are recorded as closed layout opportunities when the float is
//! added. Queries merge both lists.

use app_units::{Au, MAX_AU, MIN_AU};
use log::{debug, trace};
use servo_arc::Arc;

use crate::exclusion::{Clear, Exclusion, FloatSide};
use crate::geom::{BfcOffset, BfcRect, LogicalVec2};
use crate::opportunity::{LayoutOpportunities, LayoutOpportunity, SearchOrigin};
use crate::shelf::Shelf;

/// The floats of a block formatting context, and the free space that remains around them.
///
/// This is a persistent data structure: cloning is cheap, and clones share their lists until
/// one of them adds a float. Layout of a child can therefore work on its own copy of the
/// parent's space.
#[derive(Clone, Debug)]
pub struct ExclusionSpace {
    /// Every exclusion added so far, in order. Only used for equality.
    exclusions: Arc<Vec<Arc<Exclusion>>>,
    /// The open regions below the floats, sorted by strictly increasing block offset. There
    /// is always at least one.
    shelves: Arc<Vec<Shelf>>,
    /// Regions closed off by floats, sorted by block-start offset.
    opportunities: Arc<Vec<LayoutOpportunity>>,
    /// The largest block-start offset of any float added so far.
    last_float_block_start: Au,
    /// The (logically) lowest block-end offset of the left floats.
    left_clear_offset: Au,
    /// The (logically) lowest block-end offset of the right floats.
    right_clear_offset: Au,
    has_left_float: bool,
    has_right_float: bool,
}

impl ExclusionSpace {
    /// Returns an empty exclusion space, with a single shelf at negative infinity.
    pub fn new() -> Self {
        ExclusionSpace {
            exclusions: Arc::new(Vec::new()),
            shelves: Arc::new(vec![Shelf::new(MIN_AU)]),
            opportunities: Arc::new(Vec::new()),
            last_float_block_start: MIN_AU,
            left_clear_offset: MIN_AU,
            right_clear_offset: MIN_AU,
            has_left_float: false,
            has_right_float: false,
        }
    }

    /// Whether no float has been added to this space.
    pub fn is_empty(&self) -> bool {
        self.exclusions.is_empty()
    }

    /// The number of floats added to this space.
    pub fn len(&self) -> usize {
        self.exclusions.len()
    }

    /// The floats added to this space, in the order they were added.
    pub fn exclusions(&self) -> impl Iterator<Item = &Arc<Exclusion>> {
        self.exclusions.iter()
    }

    /// The largest block-start offset of any float in this space, or `MIN_AU` if there are
    /// none. CSS 2.1 § 9.5.1 rule 6 does not allow a new float to start above it.
    pub fn last_float_block_start(&self) -> Au {
        self.last_float_block_start
    }

    /// Whether a float on the given side has been added.
    pub fn has_float(&self, side: FloatSide) -> bool {
        match side {
            FloatSide::Left => self.has_left_float,
            FloatSide::Right => self.has_right_float,
        }
    }

    /// Returns the block offset that content with the given `clear` value has to be placed at
    /// or below.
    pub fn clearance_offset(&self, clear: Clear) -> Au {
        match clear {
            Clear::None => MIN_AU,
            Clear::Left => self.left_clear_offset,
            Clear::Right => self.right_clear_offset,
            Clear::Both => self.left_clear_offset.max(self.right_clear_offset),
        }
    }

    /// Adds a float to this space.
    ///
    /// Floats are usually added in block-start order (CSS 2.1 § 9.5.1 rule 6), but any order
    /// is accepted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "ExclusionSpace::add", skip_all, level = "trace")
    )]
    pub fn add(&mut self, exclusion: Arc<Exclusion>) {
        let rect = exclusion.rect;
        let previous_last_float_block_start = self.last_float_block_start;
        self.last_float_block_start = self.last_float_block_start.max(rect.block_start_offset());

        match exclusion.side {
            FloatSide::Left => {
                self.has_left_float = true;
                self.left_clear_offset = self.left_clear_offset.max(rect.block_end_offset());
            },
            FloatSide::Right => {
                self.has_right_float = true;
                self.right_clear_offset = self.right_clear_offset.max(rect.block_end_offset());
            },
        }

        // A float without area leaves all the space around it intact.
        if exclusion.is_empty() {
            trace!("Not narrowing shelves for empty {:?}", exclusion);
        } else {
            // Closed opportunities end where a float starts, so only a float starting above
            // an earlier one can overlap them.
            if rect.block_start_offset() < previous_last_float_block_start {
                self.trim_closed_opportunities(&exclusion);
            }
            self.add_to_shelves(&exclusion);
        }

        Arc::make_mut(&mut self.exclusions).push(exclusion);
        self.debug_assert_shelves_are_valid();
    }

    fn add_to_shelves(&mut self, exclusion: &Arc<Exclusion>) {
        let rect = &exclusion.rect;
        let block_start = rect.block_start_offset();
        let block_end = rect.block_end_offset();
        let earlier_exclusions = &self.exclusions[..];
        let shelves = Arc::make_mut(&mut self.shelves);

        let mut index = 0;
        let mut stopped = false;
        while index < shelves.len() {
            let next_block_offset = shelves.get(index + 1).map(|next| next.block_offset);
            let shelf = &mut shelves[index];

            // Whether this float ends in the space between this shelf and the next one, e.g.
            //
            //    0 1 2 3 4 5 6 7 8
            // 0  +-----+X----X+---+
            //    |xxxxx|      |xxx|
            // 10 +-----+      |xxx|
            //    +---+        |xxx|
            // 20 |NEW|        |xxx|
            //    |xxx|        |xxx|
            // 30 +---+X------X+---+
            //
            // where a new shelf appears at the block end of "NEW". This has to be known before
            // the shelf is narrowed, as that may remove it.
            let ends_before_next_shelf = next_block_offset.is_some_and(|next_block_offset| {
                block_end >= shelf.block_offset && block_end < next_block_offset
            });
            let snapshot = ends_before_next_shelf.then(|| shelf.clone());

            let is_below = block_start > shelf.block_offset;
            if is_below {
                Self::record_closed_opportunity(&mut self.opportunities, shelf, exclusion);
            }

            //    0 1 2 3 4 5 6 7 8
            // 0  +---+
            //    |xxx|
            // 10 |xxx|    +---+
            //    X--------|NEW|--X
            //             +---+
            let is_intersecting = !is_below && block_end > shelf.block_offset;

            let mut removed = false;
            if is_below || is_intersecting {
                shelf.narrow(exclusion);

                // Floats below several shelves can narrow them to the same extent, e.g.
                //
                //    0 1 2 3 4 5 6 7 8
                // 0  +---+X----------X
                //    |xxx|
                // 10 |xxx|
                //    X---------------X
                // 20
                //        +---+
                // 30     |NEW|
                //        +---+
                //
                // Only the first of them is kept.
                let is_same_as_previous =
                    index > 0 && shelves[index - 1].extent() == shelves[index].extent();
                if is_same_as_previous || shelves[index].is_degenerate() {
                    trace!("Removing shelf {:?}", shelves[index]);
                    shelves.remove(index);
                    removed = true;
                }
            }

            if let Some(snapshot) = snapshot {
                if block_end != snapshot.block_offset {
                    let new_shelf = Shelf::below(&snapshot, block_end, earlier_exclusions);
                    let insertion_index = if removed { index } else { index + 1 };
                    Self::insert_shelf(shelves, insertion_index, new_shelf);
                }
                // Shelves further down start below this float, so it can't affect them.
                stopped = true;
                break;
            }

            if !removed {
                index += 1;
            }
        }

        if !stopped && shelves.last().is_none_or(|last| block_end > last.block_offset) {
            trace!("Appending shelf at {:?}", block_end);
            shelves.push(Shelf::new(block_end));
        }
    }

    /// Inserts `new_shelf` at `index`, unless it would duplicate the extent of the shelf
    /// before it. A shelf after it with the same extent is dropped instead.
    fn insert_shelf(shelves: &mut Vec<Shelf>, index: usize, new_shelf: Shelf) {
        if index > 0 && shelves[index - 1].extent() == new_shelf.extent() {
            trace!("Not inserting duplicate shelf {:?}", new_shelf);
            return;
        }
        if shelves
            .get(index)
            .is_some_and(|next| next.extent() == new_shelf.extent())
        {
            trace!("Replacing duplicate shelf {:?}", shelves[index]);
            shelves.remove(index);
        }
        trace!("Inserting shelf {:?}", new_shelf);
        shelves.insert(index, new_shelf);
    }

    /// Cuts the space taken by `exclusion` out of the closed opportunities it overlaps. Each
    /// overlapped opportunity is replaced by the parts of it that remain above, beside and
    /// below the float.
    fn trim_closed_opportunities(&mut self, exclusion: &Exclusion) {
        let rect = &exclusion.rect;
        let overlaps = |opportunity: &LayoutOpportunity| {
            let other = &opportunity.rect;
            rect.block_start_offset() < other.block_end_offset() &&
                other.block_start_offset() < rect.block_end_offset() &&
                match exclusion.side {
                    FloatSide::Left => rect.line_end_offset() > other.line_start_offset(),
                    FloatSide::Right => rect.line_start_offset() < other.line_end_offset(),
                }
        };
        if !self.opportunities.iter().any(overlaps) {
            return;
        }

        let mut trimmed = Vec::with_capacity(self.opportunities.len() + 2);
        for opportunity in self.opportunities.iter() {
            if !overlaps(opportunity) {
                trimmed.push(*opportunity);
                continue;
            }
            debug!("Trimming {:?} around {:?}", opportunity, exclusion);

            let other = &opportunity.rect;
            if other.block_start_offset() < rect.block_start_offset() {
                trimmed.push(LayoutOpportunity::new(BfcRect::new(
                    other.start_offset,
                    BfcOffset::new(other.line_end_offset(), rect.block_start_offset()),
                )));
            }

            let (line_start, line_end) = match exclusion.side {
                FloatSide::Left => (
                    other.line_start_offset().max(rect.line_end_offset()),
                    other.line_end_offset(),
                ),
                FloatSide::Right => (
                    other.line_start_offset(),
                    other.line_end_offset().min(rect.line_start_offset()),
                ),
            };
            if line_start < line_end {
                trimmed.push(LayoutOpportunity::new(BfcRect::new(
                    BfcOffset::new(line_start, other.block_start_offset()),
                    BfcOffset::new(line_end, other.block_end_offset()),
                )));
            }

            if rect.block_end_offset() < other.block_end_offset() {
                trimmed.push(LayoutOpportunity::new(BfcRect::new(
                    BfcOffset::new(other.line_start_offset(), rect.block_end_offset()),
                    other.end_offset,
                )));
            }
        }

        // The pieces below a float start further down than the opportunity they came from.
        trimmed.sort_by_key(|opportunity| opportunity.rect.block_start_offset());
        self.opportunities = Arc::new(trimmed);
    }

    /// A float below `shelf` may close off the area between the shelf and the float. This
    /// records that area as an opportunity, as long as the floats at the edges of the shelf
    /// are still there when the new float starts, e.g.
    ///
    /// ```text
    ///    0 1 2 3 4 5 6 7 8
    /// 0  +---+  X----X+---+
    ///    |xxx|  .     |xxx|
    /// 10 |xxx|  .     |xxx|
    ///    +---+  .     +---+
    /// 20        .     .
    ///      +---+. .+---+
    /// 30   |xxx|   |NEW|
    ///      |xxx|   +---+
    /// 40   +---+
    /// ```
    ///
    /// The shelf drawn with `X` is bounded by floats on both sides, but when "NEW" starts the
    /// left float has already ended, so no opportunity is recorded for it.
    fn record_closed_opportunity(
        opportunities: &mut Arc<Vec<LayoutOpportunity>>,
        shelf: &Shelf,
        exclusion: &Exclusion,
    ) {
        let block_start = exclusion.rect.block_start_offset();
        if !shelf.has_solid_edges(shelf.block_offset, block_start) ||
            !shelf.overlaps_inline(exclusion)
        {
            return;
        }

        let opportunity = LayoutOpportunity::new(BfcRect::new(
            BfcOffset::new(shelf.line_left, shelf.block_offset),
            BfcOffset::new(shelf.line_right, block_start),
        ));
        debug!("Closing off {:?}", opportunity);

        // Keep the list sorted, with later additions after earlier ones at the same offset.
        let opportunities = Arc::make_mut(opportunities);
        let index = opportunities.partition_point(|existing| {
            existing.rect.block_start_offset() <= shelf.block_offset
        });
        opportunities.insert(index, opportunity);
    }

    /// Returns the layout opportunities at or below `origin`, clipped to the inline range
    /// `[origin.line_offset, origin.line_offset + available_inline_size)`, in block-start
    /// order.
    pub fn layout_opportunities(
        &self,
        origin: &BfcOffset,
        available_inline_size: Au,
    ) -> LayoutOpportunities<'_> {
        LayoutOpportunities::new(
            &self.opportunities,
            &self.shelves,
            *origin,
            available_inline_size,
        )
    }

    /// Like [`Self::layout_opportunities`], but collected.
    pub fn all_layout_opportunities(
        &self,
        origin: &BfcOffset,
        available_inline_size: Au,
    ) -> Vec<LayoutOpportunity> {
        self.layout_opportunities(origin, available_inline_size)
            .collect()
    }

    /// Returns the first layout opportunity, in block order, in which an object of
    /// `minimum_size` fits.
    ///
    /// An opportunity as wide as `available_size.inline` is accepted even when it is narrower
    /// than `minimum_size.inline`: nothing wider can be found further down, and content that
    /// is too wide for its containing block has to go somewhere.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ExclusionSpace::find_layout_opportunity",
            skip_all,
            level = "trace"
        )
    )]
    pub fn try_find_layout_opportunity(
        &self,
        origin: impl Into<SearchOrigin>,
        available_size: &LogicalVec2<Au>,
        minimum_size: &LogicalVec2<Au>,
    ) -> Option<LayoutOpportunity> {
        let origin = match origin.into() {
            SearchOrigin::At(origin) => origin,
            SearchOrigin::Unconstrained { block_offset } => {
                return Some(self.unconstrained_layout_opportunity(block_offset));
            },
        };

        self.layout_opportunities(&origin, available_size.inline)
            .find(|opportunity| {
                opportunity.block_size() >= minimum_size.block &&
                    (opportunity.inline_size() >= minimum_size.inline ||
                        opportunity.inline_size() == available_size.inline)
            })
    }

    /// Like [`Self::try_find_layout_opportunity`], for callers which know that an opportunity
    /// exists.
    ///
    /// # Panics
    ///
    /// If there is no opportunity for the given sizes below `origin`.
    pub fn find_layout_opportunity(
        &self,
        origin: impl Into<SearchOrigin>,
        available_size: &LogicalVec2<Au>,
        minimum_size: &LogicalVec2<Au>,
    ) -> LayoutOpportunity {
        let origin = origin.into();
        match self.try_find_layout_opportunity(origin, available_size, minimum_size) {
            Some(opportunity) => opportunity,
            None => panic!(
                "No layout opportunity of {:?} within {:?} at {:?}",
                minimum_size, available_size, origin
            ),
        }
    }

    /// The opportunity below the last shelf, used for placement without inline constraints.
    /// It has no inline size and ignores whether the shelf's edges are still solid.
    fn unconstrained_layout_opportunity(&self, block_offset: Au) -> LayoutOpportunity {
        let last_block_offset = self
            .shelves
            .last()
            .map_or(MIN_AU, |shelf| shelf.block_offset);
        let start_offset = BfcOffset::new(MAX_AU, last_block_offset.max(block_offset));
        LayoutOpportunity::new(BfcRect::new(
            start_offset,
            BfcOffset::new(MAX_AU, MAX_AU),
        ))
    }

    fn debug_assert_shelves_are_valid(&self) {
        debug_assert!(!self.shelves.is_empty());
        debug_assert!(
            self.shelves
                .windows(2)
                .all(|pair| pair[0].block_offset < pair[1].block_offset &&
                    pair[0].extent() != pair[1].extent())
        );
        debug_assert!(self.shelves.iter().all(|shelf| !shelf.is_degenerate()));
    }
}

impl Default for ExclusionSpace {
    fn default() -> Self {
        Self::new()
    }
}

/// Two exclusion spaces are equal when the same floats were added to them in the same order.
/// Different histories that happen to leave the same free space behind are not equal.
impl PartialEq for ExclusionSpace {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.exclusions, &other.exclusions) || self.exclusions == other.exclusions
    }
}

impl Eq for ExclusionSpace {}

#[cfg(test)]
mod tests {
    use app_units::{Au, MAX_AU, MIN_AU};
    use quickcheck::{Arbitrary, Gen};
    use servo_arc::Arc;

    use super::ExclusionSpace;
    use crate::exclusion::{Exclusion, FloatSide};
    use crate::geom::{BfcOffset, BfcRect};

    fn px(value: i32) -> Au {
        Au::from_px(value)
    }

    fn float(side: FloatSide, line: (i32, i32), block: (i32, i32)) -> Arc<Exclusion> {
        Exclusion::new(
            BfcRect::new(
                BfcOffset::new(px(line.0), px(block.0)),
                BfcOffset::new(px(line.1), px(block.1)),
            ),
            side,
        )
    }

    fn shelves(space: &ExclusionSpace) -> Vec<(Au, Au, Au)> {
        space
            .shelves
            .iter()
            .map(|shelf| (shelf.block_offset, shelf.line_left, shelf.line_right))
            .collect()
    }

    #[test]
    fn test_new_space_has_sentinel_shelf() {
        let space = ExclusionSpace::new();
        assert_eq!(shelves(&space), vec![(MIN_AU, MIN_AU, MAX_AU)]);
        assert!(space.opportunities.is_empty());
    }

    #[test]
    fn test_single_float_adds_shelf_at_block_end() {
        let mut space = ExclusionSpace::new();
        space.add(float(FloatSide::Left, (0, 10), (0, 20)));
        assert_eq!(
            shelves(&space),
            vec![(MIN_AU, px(10), MAX_AU), (px(20), MIN_AU, MAX_AU)]
        );
        // The float closes off everything above it.
        assert_eq!(space.opportunities.len(), 1);
        assert_eq!(space.opportunities[0].rect.block_end_offset(), px(0));
    }

    #[test]
    fn test_float_ending_between_shelves_inserts_shelf() {
        let mut space = ExclusionSpace::new();
        space.add(float(FloatSide::Left, (0, 10), (0, 100)));
        space.add(float(FloatSide::Left, (0, 20), (0, 30)));
        assert_eq!(
            shelves(&space),
            vec![
                (MIN_AU, px(20), MAX_AU),
                (px(30), px(10), MAX_AU),
                (px(100), MIN_AU, MAX_AU),
            ]
        );
    }

    #[test]
    fn test_intersecting_float_narrows_later_shelf() {
        let mut space = ExclusionSpace::new();
        space.add(float(FloatSide::Left, (0, 10), (0, 10)));
        space.add(float(FloatSide::Right, (40, 50), (0, 30)));
        assert_eq!(
            shelves(&space),
            vec![
                (MIN_AU, px(10), px(40)),
                (px(10), MIN_AU, px(40)),
                (px(30), MIN_AU, MAX_AU),
            ]
        );
    }

    #[test]
    fn test_degenerate_shelf_is_removed() {
        let mut space = ExclusionSpace::new();
        space.add(float(FloatSide::Left, (0, 60), (0, 10)));
        space.add(float(FloatSide::Right, (40, 100), (0, 10)));
        assert_eq!(shelves(&space), vec![(px(10), MIN_AU, MAX_AU)]);
    }

    #[test]
    fn test_duplicate_shelves_collapse() {
        let mut space = ExclusionSpace::new();
        space.add(float(FloatSide::Left, (0, 10), (0, 100)));
        space.add(float(FloatSide::Left, (0, 10), (0, 60)));
        assert_eq!(
            shelves(&space),
            vec![(MIN_AU, px(10), MAX_AU), (px(100), MIN_AU, MAX_AU)]
        );
    }

    #[test]
    fn test_float_below_shelf_closes_off_opportunity() {
        let mut space = ExclusionSpace::new();
        space.add(float(FloatSide::Left, (0, 10), (0, 50)));
        space.add(float(FloatSide::Right, (90, 100), (0, 50)));
        space.add(float(FloatSide::Left, (0, 40), (20, 30)));

        let closed: Vec<_> = space
            .opportunities
            .iter()
            .map(|opportunity| opportunity.rect)
            .collect();
        assert_eq!(
            closed,
            vec![
                BfcRect::new(BfcOffset::new(MIN_AU, MIN_AU), BfcOffset::new(MAX_AU, px(0))),
                BfcRect::new(BfcOffset::new(px(10), MIN_AU), BfcOffset::new(px(90), px(20))),
            ]
        );
        assert_eq!(
            shelves(&space),
            vec![
                (MIN_AU, px(40), px(90)),
                (px(30), px(10), px(90)),
                (px(50), MIN_AU, MAX_AU),
            ]
        );
    }

    #[test]
    fn test_empty_float_only_updates_clearance() {
        let mut space = ExclusionSpace::new();
        space.add(float(FloatSide::Left, (0, 0), (0, 20)));
        assert_eq!(shelves(&space), vec![(MIN_AU, MIN_AU, MAX_AU)]);
        assert!(space.opportunities.is_empty());
        assert!(space.has_float(FloatSide::Left));
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_clone_shares_until_modified() {
        let mut space = ExclusionSpace::new();
        space.add(float(FloatSide::Left, (0, 10), (0, 20)));
        let mut copy = space.clone();
        assert!(Arc::ptr_eq(&space.shelves, &copy.shelves));
        copy.add(float(FloatSide::Right, (40, 50), (0, 20)));
        assert!(!Arc::ptr_eq(&space.shelves, &copy.shelves));
        assert_eq!(space.shelves.len(), 2);
    }

    #[derive(Clone, Debug)]
    struct FloatInput {
        side: FloatSide,
        line: (i32, i32),
        block: (i32, i32),
    }

    impl Arbitrary for FloatInput {
        fn arbitrary(generator: &mut Gen) -> FloatInput {
            let mut range = || {
                let a = (u8::arbitrary(generator) % 11) as i32 * 10;
                let b = (u8::arbitrary(generator) % 11) as i32 * 10;
                (a.min(b), a.max(b))
            };
            let line = range();
            let block = range();
            let side = if bool::arbitrary(generator) {
                FloatSide::Left
            } else {
                FloatSide::Right
            };
            FloatInput { side, line, block }
        }
    }

    /// The free inline range from `block_offset` downwards, computed from scratch.
    fn expected_extent(floats: &[Arc<Exclusion>], block_offset: Au) -> (Au, Au) {
        let alive = floats
            .iter()
            .filter(|float| !float.is_empty() && float.rect.block_end_offset() > block_offset);
        alive.fold((MIN_AU, MAX_AU), |(line_left, line_right), float| {
            match float.side {
                FloatSide::Left => (line_left.max(float.rect.line_end_offset()), line_right),
                FloatSide::Right => (line_left, line_right.min(float.rect.line_start_offset())),
            }
        })
    }

    fn check_shelves_stay_valid(floats: Vec<FloatInput>) {
        let mut space = ExclusionSpace::new();
        let mut added = Vec::new();
        for input in floats {
            let exclusion = float(input.side, input.line, input.block);
            added.push(exclusion.clone());
            space.add(exclusion);

            assert!(!space.shelves.is_empty());
            for pair in space.shelves.windows(2) {
                assert!(pair[0].block_offset < pair[1].block_offset);
                assert_ne!(pair[0].extent(), pair[1].extent());
            }
            for shelf in space.shelves.iter() {
                assert!(shelf.line_left < shelf.line_right);
                assert_eq!(shelf.extent(), expected_extent(&added, shelf.block_offset));
            }
        }
    }

    #[test]
    fn test_shelves_stay_valid() {
        let f: fn(Vec<FloatInput>) = check_shelves_stay_valid;
        quickcheck::quickcheck(f);
    }
}
