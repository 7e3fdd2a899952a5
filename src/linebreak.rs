// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `LineBreaker` + `Paginator` (§4.3): a single greedy pass that buffers
//! units into lines and commits each line at a baseline y-position as soon
//! as the next unit would violate a line-end rule. First-fit, not
//! Knuth–Plass — an explicit non-goal (§1).

use smallvec::SmallVec;

use crate::fontmap::{space_width, Font};
use crate::geometry::Box;
use crate::stats::{mean, mode};
use crate::tunables::LayoutTunables;
use crate::unit::{TypesettingUnit, UnitKind};

/// Most lines hold a handful of units; buffering indices in a `SmallVec`
/// keeps the common case off the heap.
type LineBuffer = SmallVec<[usize; 16]>;

/// Paragraph-level switches that affect line-end decisions.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphFlags {
    pub first_line_indent: bool,
    /// Rule 2 of §4.3; `ScaleSearch` disables this on its final retry
    /// (§4.4 step 5).
    pub english_break_enabled: bool,
}

/// `·6` sentence-final marks that suppress the mixed-script glue even when
/// `mixed_character_blacklist` does not (§4.3's glue rule lists this set
/// separately from `mixed_character_blacklist`, which omits `；`).
const GLUE_SUPPRESSING_MARKS: [char; 6] = ['。', '！', '？', '；', '：', '，'];

fn fit_width<G: Clone, F: Font>(unit: &TypesettingUnit<G, F>, scale: f64, tunables: &LayoutTunables) -> f64 {
    let base = unit.width * scale;
    if matches!(unit.kind, UnitKind::Formula(_)) {
        base + 2.0 * tunables.formula_pad * scale
    } else {
        base
    }
}

fn glue_width<G: Clone, F: Font>(
    prev: &TypesettingUnit<G, F>,
    cur: &TypesettingUnit<G, F>,
    base_font: &F,
    base_font_size: f64,
    scale: f64,
    tunables: &LayoutTunables,
) -> f64 {
    let scripts_differ = prev.predicates.is_cjk != cur.predicates.is_cjk;
    let neither_space = !prev.predicates.is_space && !cur.predicates.is_space;
    let neither_blacklisted = !prev.predicates.mixed_blacklist && !cur.predicates.mixed_blacklist;
    let prev_not_sentence_ender = !matches!(prev.unicode, Some(c) if GLUE_SUPPRESSING_MARKS.contains(&c));
    if scripts_differ && neither_space && neither_blacklisted && prev_not_sentence_ender {
        tunables.mixed_script_glue_fraction * space_width(base_font, base_font_size * scale)
    } else {
        0.0
    }
}

/// Sum of `fit_width` over the maximal run of consecutive non-breakable
/// units starting at `start` (inclusive), stopping at the first breakable
/// unit. Used by rule 2 (§4.3) so a multi-char non-breakable word is never
/// split across the line boundary.
fn non_breakable_run_width<G: Clone, F: Font>(
    units: &[TypesettingUnit<G, F>],
    start: usize,
    scale: f64,
    tunables: &LayoutTunables,
) -> f64 {
    units[start..]
        .iter()
        .take_while(|u| !u.predicates.can_break_line)
        .map(|u| fit_width(u, scale, tunables))
        .sum()
}

fn should_break_before<G: Clone, F: Font>(
    units: &[TypesettingUnit<G, F>],
    idx: usize,
    cur_w: f64,
    width: f64,
    scale: f64,
    flags: &ParagraphFlags,
    tunables: &LayoutTunables,
) -> bool {
    let unit = &units[idx];
    if unit.predicates.is_hung_punctuation {
        return false;
    }
    let w = fit_width(unit, scale, tunables);
    if cur_w + w > width {
        return true;
    }
    if flags.english_break_enabled
        && !unit.predicates.can_break_line
        && cur_w + non_breakable_run_width(units, idx, scale, tunables) > width
    {
        return true;
    }
    if unit.predicates.is_leading_punctuation && cur_w + 2.0 * w > width {
        return true;
    }
    false
}

/// Result of a single `layout` pass.
#[derive(Debug)]
pub struct LayoutOutcome<G: Clone, F: Font> {
    pub positioned: Vec<TypesettingUnit<G, F>>,
    pub all_fit: bool,
}

/// Runs the greedy line-breaking + pagination pass described in §4.3.
#[allow(clippy::too_many_arguments)]
pub fn layout<G: Clone, F: Font>(
    units: &[TypesettingUnit<G, F>],
    box_: &Box,
    scale: f64,
    line_skip: f64,
    flags: &ParagraphFlags,
    base_font: &F,
    base_font_size: f64,
    tunables: &LayoutTunables,
) -> LayoutOutcome<G, F> {
    let width = box_.width();
    let mut positioned = Vec::with_capacity(units.len());
    let mut all_fit = true;
    let mut buffer: LineBuffer = SmallVec::new();
    let mut cur_w = 0.0f64;
    let mut prev_bottom: Option<f64> = None;
    let mut line_index = 0usize;
    let mut i = 0usize;

    while i < units.len() {
        let break_here = should_break_before(units, i, cur_w, width, scale, flags, tunables);
        if break_here && !buffer.is_empty() {
            flush_line(
                units,
                &buffer,
                box_,
                scale,
                line_skip,
                flags,
                base_font,
                base_font_size,
                line_index,
                &mut prev_bottom,
                &mut positioned,
                &mut all_fit,
                tunables,
            );
            buffer.clear();
            cur_w = 0.0;
            line_index += 1;
            continue;
        }
        // Force-progress: an oversized unit with an empty buffer is placed
        // on its own line rather than looping forever.
        let unit = &units[i];
        let glue = buffer
            .last()
            .map(|&prev_idx| glue_width(&units[prev_idx], unit, base_font, base_font_size, scale, tunables))
            .unwrap_or(0.0);
        cur_w += glue + fit_width(unit, scale, tunables);
        buffer.push(i);
        i += 1;
    }
    if !buffer.is_empty() {
        flush_line(
            units,
            &buffer,
            box_,
            scale,
            line_skip,
            flags,
            base_font,
            base_font_size,
            line_index,
            &mut prev_bottom,
            &mut positioned,
            &mut all_fit,
            tunables,
        );
    }

    LayoutOutcome { positioned, all_fit }
}

#[allow(clippy::too_many_arguments)]
fn flush_line<G: Clone, F: Font>(
    units: &[TypesettingUnit<G, F>],
    buffer: &[usize],
    box_: &Box,
    scale: f64,
    line_skip: f64,
    flags: &ParagraphFlags,
    base_font: &F,
    base_font_size: f64,
    line_index: usize,
    prev_bottom: &mut Option<f64>,
    positioned: &mut Vec<TypesettingUnit<G, F>>,
    all_fit: &mut bool,
    tunables: &LayoutTunables,
) {
    let heights: Vec<f64> = buffer
        .iter()
        .map(|&idx| &units[idx])
        .filter(|u| !u.predicates.is_space)
        .map(|u| u.height * scale)
        .collect();
    let max_h = heights
        .iter()
        .cloned()
        .fold(None::<f64>, |acc, h| Some(acc.map_or(h, |a: f64| a.max(h))))
        .unwrap_or(tunables.fallback_line_height * scale);
    let mode_h = mode(&heights).unwrap_or_else(|| mean(&heights).unwrap_or(max_h));

    let new_bottom = match *prev_bottom {
        None => box_.y2 - max_h,
        Some(prev) => {
            let gap = (mode_h * line_skip).max(max_h * tunables.max_height_gap_factor);
            prev - gap
        }
    };
    *prev_bottom = Some(new_bottom);

    let mut cur_x = box_.x;
    if flags.first_line_indent && line_index == 0 {
        cur_x += 4.0 * base_font_size * scale * tunables.first_line_indent_fraction;
    }

    let mut prev_idx: Option<usize> = None;
    for &idx in buffer {
        let unit = &units[idx];
        if let Some(p) = prev_idx {
            cur_x += glue_width(&units[p], unit, base_font, base_font_size, scale, tunables);
        }
        if matches!(unit.kind, UnitKind::Formula(_)) {
            cur_x += tunables.formula_pad * scale;
        }
        let relocated = unit.relocate(cur_x, new_bottom, scale, tunables);
        if relocated.box_.y < box_.y - 1e-6 {
            *all_fit = false;
        }
        cur_x = relocated.box_.x2;
        if matches!(unit.kind, UnitKind::Formula(_)) {
            cur_x += tunables.formula_pad * scale;
        }
        positioned.push(relocated);
        prev_idx = Some(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fontmap::fake::{FakeFont, FakeFontMapper};
    use crate::fontmap::FontMapper;
    use crate::fontmap::FontId;
    use crate::model::PdfStyle;

    // `FakeFont::advance` returns `advance_per_em * size`, so monospace(1.0)
    // at font_size 10.0 gives each glyph a width of exactly 10.0.
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
    fn five_ascii_glyphs_fit_on_one_line_at_full_scale() {
        let mapper = FakeFontMapper::monospace(1.0);
        let units: Vec<_> = "abcde".chars().map(|c| glyph(c, 10.0, &mapper)).collect();
        let box_ = Box::new(0.0, 0.0, 100.0, 20.0);
        let flags = ParagraphFlags {
            first_line_indent: false,
            english_break_enabled: true,
        };
        let tunables = LayoutTunables::default();
        let outcome = layout(&units, &box_, 1.0, 1.40, &flags, mapper.base_font(), 10.0, &tunables);
        assert!(outcome.all_fit);
        assert_eq!(outcome.positioned.len(), 5);
        let xs: Vec<f64> = outcome.positioned.iter().map(|u| u.box_.x).collect();
        assert_eq!(xs, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn hung_punctuation_overflows_without_breaking() {
        let mapper = FakeFontMapper::monospace(1.0);
        let mut units: Vec<_> = "ab".chars().map(|c| glyph(c, 10.0, &mapper)).collect();
        units.push(glyph('，', 10.0, &mapper));
        let box_ = Box::new(0.0, 0.0, 15.0, 20.0);
        let flags = ParagraphFlags {
            first_line_indent: false,
            english_break_enabled: false,
        };
        let tunables = LayoutTunables::default();
        let outcome = layout(&units, &box_, 1.0, 1.40, &flags, mapper.base_font(), 10.0, &tunables);
        // 'a' fits, 'b' overflows width and forces a break, '，' is hung
        // punctuation and is appended to whichever line is open without
        // triggering a further break.
        assert!(outcome.positioned.len() == 3);
    }
}
