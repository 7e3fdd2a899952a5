// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pre-layout overlap correction (§4.7): pushes a paragraph box down when it
//! sits too close above another paragraph already placed on the page. Runs
//! once per page, before any line breaking, over the page's valid paragraph
//! boxes.

use rstar::{RTree, AABB};

use crate::error::{Result, TypesetError};
use crate::geometry::Box;
use crate::tunables::LayoutTunables;

fn required_gap(b: &Box, tunables: &LayoutTunables) -> f64 {
    if b.height() < tunables.small_box_height_threshold {
        tunables.overlap_gap_small
    } else {
        tunables.overlap_gap_large
    }
}

/// Adjusts `boxes` in place so that no paragraph sits within `required_gap`
/// points below another that horizontally overlaps it. One shot, no
/// iteration to a fixed point: a correction can open a new conflict with a
/// paragraph not yet visited, and that is left for the next page pass rather
/// than chased here.
///
/// A single paragraph whose own geometry is inconsistent (moving it down
/// would put `box.y` at or past `box.y2`) is reported as
/// [`TypesetError::OverlapAdjustFailure`] and left untouched; the caller is
/// expected to swallow this per paragraph and continue with the rest of the
/// page (§7).
pub fn correct_overlaps(boxes: &mut [Box], tunables: &LayoutTunables) -> Vec<TypesetError> {
    let tree = RTree::bulk_load(boxes.to_vec());
    let mut warnings = Vec::new();

    for i in 0..boxes.len() {
        let p = boxes[i];
        let gap = required_gap(&p, tunables);
        let strip = AABB::from_corners([p.x, p.y - gap], [p.x2, p.y]);

        let mut max_conflict_y2: Option<f64> = None;
        for candidate in tree.locate_in_envelope_intersecting(&strip) {
            if candidate.x == p.x && candidate.y == p.y && candidate.x2 == p.x2 && candidate.y2 == p.y2 {
                continue;
            }
            let conflicts = !(candidate.x2 < p.x || candidate.x > p.x2);
            if conflicts {
                max_conflict_y2 = Some(max_conflict_y2.map_or(candidate.y2, |m: f64| m.max(candidate.y2)));
            }
        }

        if let Some(max_y2) = max_conflict_y2 {
            let new_y = max_y2 + gap;
            match adjust(&boxes[i], new_y) {
                Ok(adjusted) => boxes[i] = adjusted,
                Err(e) => warnings.push(e),
            }
        }
    }

    warnings
}

fn adjust(b: &Box, new_y: f64) -> Result<Box> {
    if new_y >= b.y2 {
        return Err(TypesetError::OverlapAdjustFailure(format!(
            "paragraph box {:?} cannot be pushed to y={new_y}: would invert the box",
            b
        )));
    }
    Ok(Box::new(b.x, new_y, b.x2, b.y2))
}
