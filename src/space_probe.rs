// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `SpaceProbe` (§4.5): how far a box may grow right or down without
//! colliding with another paragraph, character, or figure on the page.
//! Backed by an R-tree (`rstar`) so the candidate scan stays cheap on pages
//! with hundreds of elements; a linear scan would also satisfy the
//! contract, since the spatial index is a performance concern, not a
//! correctness one.

use rstar::{RTree, AABB};

use crate::geometry::Box;
use crate::tunables::LayoutTunables;

pub struct SpaceProbe {
    tree: RTree<Box>,
}

impl SpaceProbe {
    pub fn new(obstacles: Vec<Box>) -> Self {
        Self {
            tree: RTree::bulk_load(obstacles),
        }
    }

    /// Farthest right `b.x2` may extend without overlapping any obstacle
    /// that starts to the right of `b.x` and shares vertical extent with
    /// it.
    pub fn max_right(&self, b: &Box, cropbox: &Box, tunables: &LayoutTunables) -> f64 {
        let mut max_right = cropbox.x2 * tunables.cropbox_right_fraction;
        let query = Self::query_envelope(b, cropbox);
        for candidate in self.tree.locate_in_envelope_intersecting(&query) {
            if candidate.x > b.x && b.vertical_overlap(candidate) {
                max_right = max_right.min(candidate.x);
            }
        }
        max_right
    }

    /// Lowest `b.y` may extend without overlapping any obstacle that ends
    /// above `b.y` and shares horizontal extent with it.
    pub fn max_bottom(&self, b: &Box, cropbox: &Box, tunables: &LayoutTunables) -> f64 {
        let mut max_bottom = cropbox.y * tunables.cropbox_bottom_fraction;
        let query = Self::query_envelope(b, cropbox);
        for candidate in self.tree.locate_in_envelope_intersecting(&query) {
            if candidate.y2 < b.y && b.horizontal_overlap(candidate) {
                max_bottom = max_bottom.max(candidate.y2);
            }
        }
        max_bottom
    }

    fn query_envelope(b: &Box, cropbox: &Box) -> AABB<[f64; 2]> {
        let lo_x = cropbox.x.min(b.x) - 1.0;
        let hi_x = cropbox.x2.max(b.x2) + 1.0;
        let lo_y = cropbox.y.min(b.y) - 1.0;
        let hi_y = cropbox.y2.max(b.y2) + 1.0;
        AABB::from_corners([lo_x, lo_y], [hi_x, hi_y])
    }
}
