// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document-wide scale harmonization (§4.8): individually optimal paragraph
//! scales are clamped to the document's most common scale so body text does
//! not look visually uneven page to page.

use crate::stats::{median, weighted_mode};

/// A paragraph's preprocess-pass result: the scale `ScaleSearch` would pick
/// in isolation, and the weight (unit count; a formula counts its character
/// count) that scale should carry in the mode computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphScale {
    pub optimal_scale: f64,
    pub weight: f64,
}

/// The document-wide scale every paragraph's `optimal_scale` is clamped to:
/// the mode of the weighted scale multiset, tie-broken to the minimum, or
/// the (unweighted) median if no mode is reported at all.
pub fn mode_scale(scales: &[ParagraphScale]) -> Option<f64> {
    let weighted = scales.iter().map(|s| (s.optimal_scale, s.weight));
    weighted_mode(weighted).or_else(|| {
        let values: Vec<f64> = scales.iter().map(|s| s.optimal_scale).collect();
        median(&values)
    })
}

/// Clamps every `optimal_scale` above `target` down to `target`, in place.
/// Idempotent: calling this twice with the same `target` leaves `scales`
/// unchanged the second time (§8 invariant 5).
pub fn clamp_to(scales: &mut [ParagraphScale], target: f64) {
    for s in scales.iter_mut() {
        if s.optimal_scale > target {
            s.optimal_scale = target;
        }
    }
}

/// Runs the full harmonization pass: computes the mode scale and clamps
/// every paragraph to it, returning the mode (or `1.0` if `scales` is
/// empty, since there is nothing to harmonize against).
pub fn harmonize(scales: &mut [ParagraphScale]) -> f64 {
    let target = mode_scale(scales).unwrap_or(1.0);
    clamp_to(scales, target);
    target
}
