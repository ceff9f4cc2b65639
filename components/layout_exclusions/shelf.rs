/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shelves: the open regions below the floats of an exclusion space.
//!
//! A shelf starting at `block_offset` describes the strip `[line_left, line_right)` that stays
//! free of floats from `block_offset` all the way down to infinity, given every float added so
//! far. The floats that define each bound are kept as the shelf's "edges", so that later
//! queries can tell whether a bound is still backed by an actual float over some block range.

use app_units::{Au, MAX_AU, MIN_AU};
use servo_arc::Arc;
use smallvec::SmallVec;

use crate::exclusion::{Exclusion, FloatSide};

/// The floats bounding one side of a shelf.
pub(crate) type Edges = SmallVec<[Arc<Exclusion>; 1]>;

#[derive(Clone, Debug)]
pub(crate) struct Shelf {
    pub block_offset: Au,
    pub line_left: Au,
    pub line_right: Au,
    pub line_left_edges: Edges,
    pub line_right_edges: Edges,
}

impl Shelf {
    /// A shelf with no floats on either side.
    pub fn new(block_offset: Au) -> Shelf {
        Shelf {
            block_offset,
            line_left: MIN_AU,
            line_right: MAX_AU,
            line_left_edges: Edges::new(),
            line_right_edges: Edges::new(),
        }
    }

    /// Creates the shelf that starts at `block_offset`, where a float which ended inside
    /// `shelf` stops constraining the space. `shelf` must be the state of the containing shelf
    /// before that float narrowed it.
    ///
    /// Edges of `shelf` that reach past `block_offset` carry over. When none do on one side,
    /// that side is bounded by the remaining floats of `earlier_exclusions` which reach past
    /// `block_offset`, or not bounded at all if there are none.
    pub fn below(shelf: &Shelf, block_offset: Au, earlier_exclusions: &[Arc<Exclusion>]) -> Shelf {
        debug_assert!(block_offset > shelf.block_offset);
        let mut new_shelf = Shelf::new(block_offset);

        collect_solid_edges(
            &shelf.line_left_edges,
            block_offset,
            &mut new_shelf.line_left_edges,
        );
        if !new_shelf.line_left_edges.is_empty() {
            new_shelf.line_left = shelf.line_left;
        } else if let Some((line_left, edges)) =
            innermost_edges(earlier_exclusions, FloatSide::Left, block_offset)
        {
            new_shelf.line_left = line_left;
            new_shelf.line_left_edges = edges;
        }

        collect_solid_edges(
            &shelf.line_right_edges,
            block_offset,
            &mut new_shelf.line_right_edges,
        );
        if !new_shelf.line_right_edges.is_empty() {
            new_shelf.line_right = shelf.line_right;
        } else if let Some((line_right, edges)) =
            innermost_edges(earlier_exclusions, FloatSide::Right, block_offset)
        {
            new_shelf.line_right = line_right;
            new_shelf.line_right_edges = edges;
        }

        new_shelf
    }

    /// The `(line_left, line_right)` pair of this shelf.
    #[inline]
    pub fn extent(&self) -> (Au, Au) {
        (self.line_left, self.line_right)
    }

    /// Whether this shelf has no room left for content.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.line_right <= self.line_left
    }

    /// Whether the given exclusion overlaps the inline extent of this shelf.
    pub fn overlaps_inline(&self, exclusion: &Exclusion) -> bool {
        exclusion.rect.line_start_offset() < self.line_right &&
            exclusion.rect.line_end_offset() > self.line_left
    }

    /// Whether both edges of this shelf are backed by a float somewhere in
    /// `[block_start, block_end)`.
    pub fn has_solid_edges(&self, block_start: Au, block_end: Au) -> bool {
        has_solid_edges(&self.line_left_edges, block_start, block_end) &&
            has_solid_edges(&self.line_right_edges, block_start, block_end)
    }

    /// Pulls the side of this shelf which matches the float side of `exclusion` in, if the
    /// exclusion reaches at least as far as the current bound. A float which pushes the bound
    /// further replaces the edges on that side, one which ends exactly on it joins them.
    pub fn narrow(&mut self, exclusion: &Arc<Exclusion>) {
        match exclusion.side {
            FloatSide::Left => {
                let line_end = exclusion.rect.line_end_offset();
                if line_end > self.line_left {
                    self.line_left_edges.clear();
                }
                if line_end >= self.line_left {
                    self.line_left = line_end;
                    self.line_left_edges.push(exclusion.clone());
                }
            },
            FloatSide::Right => {
                let line_start = exclusion.rect.line_start_offset();
                if line_start < self.line_right {
                    self.line_right_edges.clear();
                }
                if line_start <= self.line_right {
                    self.line_right = line_start;
                    self.line_right_edges.push(exclusion.clone());
                }
            },
        }
    }
}

/// Returns true if the edge list is empty, or if at least one of its floats overlaps the block
/// range `[block_start, block_end)`.
///
/// An empty list means the bound is the edge of the block formatting context itself, which is
/// always solid.
pub(crate) fn has_solid_edges(edges: &[Arc<Exclusion>], block_start: Au, block_end: Au) -> bool {
    if edges.is_empty() {
        return true;
    }

    edges.iter().any(|edge| {
        edge.rect.block_end_offset() > block_start && edge.rect.block_start_offset() < block_end
    })
}

/// Appends the edges that are still present below `block_offset` to `out_edges`.
fn collect_solid_edges(edges: &[Arc<Exclusion>], block_offset: Au, out_edges: &mut Edges) {
    out_edges.extend(
        edges
            .iter()
            .filter(|edge| edge.rect.block_end_offset() > block_offset)
            .cloned(),
    );
}

/// Finds the innermost bound on the given side among the non-empty floats that are still
/// present below `block_offset`, along with every float that sits on that bound.
fn innermost_edges(
    exclusions: &[Arc<Exclusion>],
    side: FloatSide,
    block_offset: Au,
) -> Option<(Au, Edges)> {
    let mut bound = None;
    let mut edges = Edges::new();
    for exclusion in exclusions.iter().filter(|exclusion| {
        exclusion.side == side &&
            !exclusion.is_empty() &&
            exclusion.rect.block_end_offset() > block_offset
    }) {
        let line_offset = match side {
            FloatSide::Left => exclusion.rect.line_end_offset(),
            FloatSide::Right => exclusion.rect.line_start_offset(),
        };
        let is_further_in = match (bound, side) {
            (None, _) => true,
            (Some(bound), FloatSide::Left) => line_offset > bound,
            (Some(bound), FloatSide::Right) => line_offset < bound,
        };
        if is_further_in {
            bound = Some(line_offset);
            edges.clear();
        }
        if bound == Some(line_offset) {
            edges.push(exclusion.clone());
        }
    }
    bound.map(|bound| (bound, edges))
}
