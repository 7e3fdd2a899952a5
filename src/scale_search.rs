// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `ScaleSearch` (§4.4): a deterministic descent that trades font scale
//! against box expansion against line-break relaxation to find the
//! largest scale that makes a paragraph fit.

use crate::fontmap::Font;
use crate::geometry::Box;
use crate::linebreak::{self, LayoutOutcome, ParagraphFlags};
use crate::space_probe::SpaceProbe;
use crate::tunables::LayoutTunables;
use crate::unit::TypesettingUnit;

#[derive(Debug)]
pub struct ScaleSearchOutcome<G: Clone, F: Font> {
    pub scale: f64,
    pub box_: Box,
    pub positioned: Vec<TypesettingUnit<G, F>>,
    pub all_fit: bool,
}

/// Finds the largest `scale` in `[tunables.min_scale, initial_scale]` for
/// which `linebreak::layout` reports `all_fit = true`, trying at most one
/// box expansion per phase and, if everything else fails, one whole-search
/// retry with rule 2 (English-break) disabled (§4.4 step 5).
#[allow(clippy::too_many_arguments)]
pub fn search<G: Clone, F: Font>(
    units: &[TypesettingUnit<G, F>],
    initial_box: &Box,
    initial_scale: f64,
    line_skip: f64,
    flags: ParagraphFlags,
    base_font: &F,
    base_font_size: f64,
    tunables: &LayoutTunables,
    space_probe: &SpaceProbe,
    cropbox: &Box,
) -> ScaleSearchOutcome<G, F> {
    let outcome = descend(
        units,
        initial_box,
        initial_scale,
        line_skip,
        flags,
        base_font,
        base_font_size,
        tunables,
        space_probe,
        cropbox,
    );
    if outcome.all_fit || !flags.english_break_enabled {
        return outcome;
    }
    let relaxed_flags = ParagraphFlags {
        english_break_enabled: false,
        ..flags
    };
    descend(
        units,
        initial_box,
        initial_scale,
        line_skip,
        relaxed_flags,
        base_font,
        base_font_size,
        tunables,
        space_probe,
        cropbox,
    )
}

#[allow(clippy::too_many_arguments)]
fn descend<G: Clone, F: Font>(
    units: &[TypesettingUnit<G, F>],
    initial_box: &Box,
    initial_scale: f64,
    line_skip: f64,
    flags: ParagraphFlags,
    base_font: &F,
    base_font_size: f64,
    tunables: &LayoutTunables,
    space_probe: &SpaceProbe,
    cropbox: &Box,
) -> ScaleSearchOutcome<G, F> {
    let mut scale = initial_scale;
    let mut box_ = *initial_box;
    let mut phase0_tried = false;
    let mut phase1_tried = false;
    let mut last: Option<LayoutOutcome<G, F>> = None;

    loop {
        let outcome = linebreak::layout(
            units,
            &box_,
            scale,
            line_skip,
            &flags,
            base_font,
            base_font_size,
            tunables,
        );
        let fit = outcome.all_fit;
        last = Some(outcome);
        if fit {
            let outcome = last.unwrap();
            return ScaleSearchOutcome {
                scale,
                box_,
                positioned: outcome.positioned,
                all_fit: true,
            };
        }

        let before = scale;
        scale -= if before > tunables.coarse_step_floor {
            tunables.fine_step
        } else {
            tunables.coarse_step
        };

        if before >= tunables.expansion_trigger_scale && scale < tunables.expansion_trigger_scale {
            if !phase0_tried {
                phase0_tried = true;
                let candidate = space_probe.max_bottom(&box_, cropbox, tunables) + tunables.bottom_expansion_margin;
                if candidate < box_.y {
                    box_.y = candidate;
                    scale = tunables.initial_preprocess_scale;
                    continue;
                }
            } else if !phase1_tried {
                phase1_tried = true;
                let candidate = space_probe.max_right(&box_, cropbox, tunables) - tunables.right_expansion_margin;
                if candidate > box_.x2 {
                    box_.x2 = candidate;
                    scale = tunables.initial_preprocess_scale;
                    continue;
                }
            }
        }

        if scale < tunables.min_scale {
            let outcome = linebreak::layout(
                units,
                &box_,
                tunables.min_scale,
                line_skip,
                &flags,
                base_font,
                base_font_size,
                tunables,
            );
            return ScaleSearchOutcome {
                scale: tunables.min_scale,
                box_,
                positioned: outcome.positioned,
                all_fit: false,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fontmap::fake::{FakeFont, FakeFontMapper};
    use crate::fontmap::{FontId, FontMapper};
    use crate::model::PdfStyle;

    fn glyph(c: char, font_size: f64, mapper: &FakeFontMapper) -> TypesettingUnit<(), FakeFont> {
        TypesettingUnit::from_translated_str(
            &c.to_string(),
            mapper.base_font().clone(),
            FontId(0),
            font_size,
            PdfStyle {
                font_id: FontId(0),
                font_size,
                graphic_state: (),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn six_non_breakable_glyphs_settle_at_point_eight() {
        let mapper = FakeFontMapper::monospace(1.0);
        let units: Vec<_> = "abcdef".chars().map(|c| glyph(c, 10.0, &mapper)).collect();
        let box_ = Box::new(0.0, 0.0, 50.0, 20.0);
        let cropbox = Box::new(0.0, 0.0, 200.0, 200.0);
        let flags = ParagraphFlags {
            first_line_indent: false,
            english_break_enabled: true,
        };
        let tunables = LayoutTunables::default();
        let probe = SpaceProbe::new(vec![]);
        let result = search(
            &units,
            &box_,
            1.0,
            1.40,
            flags,
            mapper.base_font(),
            10.0,
            &tunables,
            &probe,
            &cropbox,
        );
        // 6 glyphs of width 10 need total width <= 50, i.e. scale <= 0.8333;
        // stepping down by `fine_step` (0.05) from 1.0, the first scale that
        // both fits on one line and clears the box vertically is 0.80 (0.85
        // still overflows the line by 1 unit of width).
        assert!(result.all_fit);
        assert!((result.scale - 0.80).abs() < 1e-9);
    }
}
