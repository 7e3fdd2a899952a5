// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunable constants pulled out of the algorithm bodies so they can be
//! characterized or adjusted without touching control-flow code. Defaults
//! reproduce the literal values used in §4.3/§4.4/§4.7.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTunables {
    /// Largest scale `ScaleSearch` will start a preprocess pass at.
    pub initial_preprocess_scale: f64,
    /// Floor below which `ScaleSearch` gives up and commits the last
    /// attempt (§4.4 step 6).
    pub min_scale: f64,
    /// Step size while `scale > coarse_step_floor`.
    pub fine_step: f64,
    /// Step size once `scale <= coarse_step_floor`.
    pub coarse_step: f64,
    /// Threshold separating `fine_step` from `coarse_step`.
    pub coarse_step_floor: f64,
    /// Scale below which a box expansion attempt is triggered.
    pub expansion_trigger_scale: f64,
    /// Points of slack added beyond `SpaceProbe::max_bottom`.
    pub bottom_expansion_margin: f64,
    /// Points of slack subtracted from `SpaceProbe::max_right`.
    pub right_expansion_margin: f64,
    /// Per-side padding around a formula unit for line-fit purposes.
    pub formula_pad: f64,
    /// Fraction of `space_width` used as CJK/Latin inter-script glue.
    pub mixed_script_glue_fraction: f64,
    /// Line-skip ratio for CJK target languages.
    pub line_skip_cjk: f64,
    /// Line-skip ratio for non-CJK target languages.
    pub line_skip_latin: f64,
    /// Fallback line height when a line is made up entirely of spaces.
    pub fallback_line_height: f64,
    /// Multiplier applied to `max_h` in the baseline-gap formula.
    pub max_height_gap_factor: f64,
    /// First-line indent, as a fraction of `base_font_size * scale * 2`.
    pub first_line_indent_fraction: f64,
    /// Required vertical gap (§4.7) below this paragraph height.
    pub overlap_gap_small: f64,
    /// Required vertical gap (§4.7) at/above `small_box_height_threshold`.
    pub overlap_gap_large: f64,
    /// Paragraph-box-height threshold between `overlap_gap_small/large`.
    pub small_box_height_threshold: f64,
    /// `cropbox.x2` multiplier used as the outer bound for `max_right`.
    pub cropbox_right_fraction: f64,
    /// `cropbox.y` multiplier used as the outer bound for `max_bottom`.
    pub cropbox_bottom_fraction: f64,
    /// Formula level-grouping tolerance, in px of y-center difference.
    pub formula_level_tolerance: f64,
}

impl Default for LayoutTunables {
    fn default() -> Self {
        Self {
            initial_preprocess_scale: 1.0,
            min_scale: 0.1,
            fine_step: 0.05,
            coarse_step: 0.1,
            coarse_step_floor: 0.6,
            expansion_trigger_scale: 0.7,
            bottom_expansion_margin: 2.0,
            right_expansion_margin: 5.0,
            formula_pad: 3.0,
            mixed_script_glue_fraction: 0.5,
            line_skip_cjk: 1.50,
            line_skip_latin: 1.40,
            fallback_line_height: 10.0,
            max_height_gap_factor: 1.05,
            first_line_indent_fraction: 0.5,
            overlap_gap_small: 0.5,
            overlap_gap_large: 3.0,
            small_box_height_threshold: 36.0,
            cropbox_right_fraction: 0.9,
            cropbox_bottom_fraction: 1.1,
            formula_level_tolerance: 2.0,
        }
    }
}
