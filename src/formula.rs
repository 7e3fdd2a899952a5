// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `FormulaRelocator` (§4.6): relocates a formula's characters, curves, and
//! forms under an affine transform while preserving its internal baseline
//! structure. Level-snapping (grouping characters whose y-centers are
//! within a small tolerance) eliminates sub-pixel baseline jitter from
//! OCR/parse noise, which otherwise compounds under scaling.

use crate::geometry::{Box, RelocationTransform};
use crate::model::PdfFormula;
use crate::stats::mode;
use crate::tunables::LayoutTunables;

struct Level {
    y_center_sum: f64,
    count: usize,
    members: Vec<usize>,
}

impl Level {
    fn mean(&self) -> f64 {
        self.y_center_sum / self.count as f64
    }
}

/// Groups character indices (by their original box's y-center) into
/// baseline levels, greedily, in input order (§4.6 step 1).
fn group_levels(y_centers: &[f64], tolerance: f64) -> Vec<Level> {
    let mut levels: Vec<Level> = Vec::new();
    for (i, &yc) in y_centers.iter().enumerate() {
        let existing = levels
            .iter_mut()
            .find(|level| (yc - level.mean()).abs() < tolerance);
        match existing {
            Some(level) => {
                level.y_center_sum += yc;
                level.count += 1;
                level.members.push(i);
            }
            None => levels.push(Level {
                y_center_sum: yc,
                count: 1,
                members: vec![i],
            }),
        }
    }
    levels
}

/// Relocates `formula` so its content is positioned with bottom-left at
/// `(target_x, target_y)` and scaled by `scale`, preserving relative
/// baseline levels (§4.6).
pub fn relocate_formula<G: Clone>(
    formula: &PdfFormula<G>,
    target_x: f64,
    target_y: f64,
    scale: f64,
    tunables: &LayoutTunables,
) -> PdfFormula<G> {
    let y_centers: Vec<f64> = formula
        .characters
        .iter()
        .map(|c| (c.box_.y + c.box_.y2) / 2.0)
        .collect();
    let levels = group_levels(&y_centers, tunables.formula_level_tolerance);

    let mut level_of = vec![0usize; formula.characters.len()];
    let mut baseline_of_level = vec![0.0f64; levels.len()];
    let mut font_size_of_level = vec![12.0f64; levels.len()];
    for (level_idx, level) in levels.iter().enumerate() {
        baseline_of_level[level_idx] = level.mean();
        let sizes: Vec<f64> = level
            .members
            .iter()
            .map(|&i| formula.characters[i].style.font_size)
            .collect();
        font_size_of_level[level_idx] = mode(&sizes).unwrap_or(12.0);
        for &member in &level.members {
            level_of[member] = level_idx;
        }
    }

    let mut relocated_chars = Vec::with_capacity(formula.characters.len());
    for (i, character) in formula.characters.iter().enumerate() {
        let level_idx = level_of[i];
        let level_baseline = baseline_of_level[level_idx];
        let _dominant_size = font_size_of_level[level_idx];

        let rel_x = character.box_.x - formula.box_.x;
        let rel_y = level_baseline - formula.box_.y;
        let new_y_baseline = target_y + (rel_y + formula.y_offset) * scale;
        let new_h = character.box_.height() * scale;
        let new_y = new_y_baseline - new_h / 2.0;
        let new_y2 = new_y_baseline + new_h / 2.0;
        let new_x = target_x + (rel_x + formula.x_offset) * scale;
        let new_x2 = new_x + character.box_.width() * scale;

        let mut relocated = character.clone();
        let dx = new_x - character.box_.x;
        let dy = new_y - character.box_.y;
        relocated.box_ = Box::new(new_x, new_y, new_x2, new_y2);
        relocated.style.font_size *= scale;
        relocated.scale *= scale;
        relocated.advance *= scale;
        relocated.visual_bbox = character.visual_bbox.map(|v| {
            let translated = v.translated(dx, dy);
            Box::new(translated.x, new_y, translated.x2, new_y2)
        });
        relocated_chars.push(relocated);
    }

    let transform = RelocationTransform::relocating(
        formula.box_.x,
        formula.box_.y,
        formula.x_offset,
        formula.y_offset,
        target_x,
        target_y,
        scale,
    );
    let relocated_curves = formula
        .curves
        .iter()
        .map(|curve| {
            let mut c = curve.clone();
            c.box_ = transform.apply_to_box(&curve.box_);
            c.relocation = Some(transform);
            c
        })
        .collect();
    let relocated_forms = formula
        .forms
        .iter()
        .map(|form| {
            let mut f = form.clone();
            f.box_ = transform.apply_to_box(&form.box_);
            f.relocation = Some(transform);
            f
        })
        .collect();

    let new_box = aabb_of(&relocated_chars).unwrap_or(Box::new(target_x, target_y, target_x, target_y));

    PdfFormula {
        box_: new_box,
        characters: relocated_chars,
        curves: relocated_curves,
        forms: relocated_forms,
        x_offset: formula.x_offset * scale,
        y_offset: formula.y_offset * scale,
        x_advance: formula.x_advance * scale,
    }
}

fn aabb_of<G: Clone>(characters: &[crate::model::PdfCharacter<G>]) -> Option<Box> {
    let mut iter = characters.iter();
    let first = iter.next()?;
    let mut b = first.box_;
    for c in iter {
        b = Box::new(b.x.min(c.box_.x), b.y.min(c.box_.y), b.x2.max(c.box_.x2), b.y2.max(c.box_.y2));
    }
    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fontmap::FontId;
    use crate::model::{PdfCharacter, PdfStyle};

    fn char_at(unicode: char, x: f64, y: f64, w: f64, h: f64, font_size: f64) -> PdfCharacter<()> {
        PdfCharacter {
            id: 0,
            unicode,
            box_: Box::new(x, y, x + w, y + h),
            style: PdfStyle {
                font_id: FontId(0),
                font_size,
                graphic_state: (),
            },
            scale: 1.0,
            vertical: false,
            advance: w,
            xobj_id: None,
            visual_bbox: None,
            main_render_order: None,
            sub_render_order: None,
        }
    }

    #[test]
    fn identity_relocation_preserves_geometry() {
        let formula = PdfFormula {
            box_: Box::new(0.0, 0.0, 20.0, 10.0),
            characters: vec![char_at('x', 0.0, 0.0, 5.0, 10.0, 12.0)],
            curves: vec![],
            forms: vec![],
            x_offset: 0.0,
            y_offset: 0.0,
            x_advance: 20.0,
        };
        let relocated = relocate_formula(&formula, 0.0, 0.0, 1.0, &LayoutTunables::default());
        let orig = &formula.characters[0].box_;
        let new = &relocated.characters[0].box_;
        assert!((orig.x - new.x).abs() < 1e-9);
        assert!((orig.y - new.y).abs() < 1e-9);
        assert!((orig.x2 - new.x2).abs() < 1e-9);
        assert!((orig.y2 - new.y2).abs() < 1e-9);
    }

    #[test]
    fn two_close_baselines_snap_to_one_level() {
        let formula = PdfFormula {
            box_: Box::new(0.0, 0.0, 30.0, 20.0),
            characters: vec![
                char_at('a', 0.0, 10.0, 5.0, 1.0, 10.0),
                char_at('b', 6.0, 10.5, 5.0, 1.0, 10.0),
                char_at('c', 12.0, 22.0, 5.0, 1.0, 10.0),
            ],
            curves: vec![],
            forms: vec![],
            x_offset: 0.0,
            y_offset: 0.0,
            x_advance: 30.0,
        };
        let y_centers: Vec<f64> = formula
            .characters
            .iter()
            .map(|c| (c.box_.y + c.box_.y2) / 2.0)
            .collect();
        let levels = group_levels(&y_centers, 2.0);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].members, vec![0, 1]);
        assert_eq!(levels[1].members, vec![2]);

        let relocated = relocate_formula(&formula, 0.0, 0.0, 1.0, &LayoutTunables::default());
        let y0 = (relocated.characters[0].box_.y + relocated.characters[0].box_.y2) / 2.0;
        let y1 = (relocated.characters[1].box_.y + relocated.characters[1].box_.y2) / 2.0;
        assert!((y0 - y1).abs() < 1e-9);
    }
}
