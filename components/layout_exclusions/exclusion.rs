/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Floats as seen by the exclusion space.
//!
//! See CSS 2.1 § 9.5.1: <https://www.w3.org/TR/CSS2/visuren.html#float-position>

use servo_arc::Arc;

use crate::geom::BfcRect;

/// Whether a float is attached to the line-left or the line-right edge of its containing block.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FloatSide {
    Left,
    Right,
}

/// Which floats a box has to be placed below.
///
/// See CSS 2.1 § 9.5.2: <https://www.w3.org/TR/CSS2/visuren.html#flow-control>
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Clear {
    None,
    Left,
    Right,
    Both,
}

/// The margin box of a positioned float, which other content has to flow around.
///
/// Exclusions are immutable once created. They are shared between the layout code that created
/// them and every [`crate::ExclusionSpace`] (and every shelf inside it) they were added to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Exclusion {
    /// The margin box of the float, relative to the block formatting context.
    pub rect: BfcRect,
    /// The side the float is attached to.
    pub side: FloatSide,
}

impl Exclusion {
    /// Creates a new shared exclusion.
    pub fn new(rect: BfcRect, side: FloatSide) -> Arc<Exclusion> {
        Arc::new(Exclusion { rect, side })
    }

    /// Whether this exclusion covers no area. Such exclusions still count for clearance, but
    /// never take space away from content.
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }
}
