/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Float exclusions and layout opportunities for block formatting contexts.
//!
//! Layout adds every float it positions to an [`ExclusionSpace`], and asks the space where the
//! next piece of content can go with [`ExclusionSpace::find_layout_opportunity`] or
//! [`ExclusionSpace::all_layout_opportunities`].

#![deny(unsafe_code)]

mod exclusion;
mod exclusion_space;
pub mod geom;
mod opportunity;
mod shelf;

pub use exclusion::{Clear, Exclusion, FloatSide};
pub use exclusion_space::ExclusionSpace;
pub use geom::{BfcOffset, BfcRect, LogicalVec2};
pub use opportunity::{LayoutOpportunities, LayoutOpportunity, SearchOrigin};
