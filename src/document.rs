// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document-level driver (§2, §5, §6): wires `TypesettingUnit`
//! construction, `ScaleSearch`, overlap correction, harmonization, and
//! render-order assignment into the preprocess → harmonize → render
//! pipeline. Pages are processed sequentially; within a page, paragraphs are
//! processed sequentially because they mutate shared page state (`curves`,
//! `forms`, the paragraph-box spatial index).
//!
//! The preprocess pass (step 1 of [`harmonize`]) only reads paragraph-local
//! data, so an embarrassingly-parallel implementation may run it with a
//! worker pool across paragraphs; this module runs it sequentially and
//! leaves that as a caller-level decision, same as the render pass must stay
//! sequential to preserve deterministic page output.

use tracing::warn;

use crate::error::{Result, TypesetError};
use crate::fontmap::{Font, FontMapper};
use crate::geometry::Box;
use crate::harmonize::{self, ParagraphScale};
use crate::linebreak::ParagraphFlags;
use crate::model::{Composition, Page, PdfCurve, PdfForm, PdfParagraph};
use crate::overlap;
use crate::render_order;
use crate::scale_search;
use crate::space_probe::SpaceProbe;
use crate::tunables::LayoutTunables;
use crate::unit::TypesettingUnit;

/// A document-level cancellation signal (§5). Checked once per page before
/// render; a long-running preprocess may check it more often.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

impl CancellationToken for () {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Expands a paragraph's compositions into the flat `TypesettingUnit`
/// sequence `ScaleSearch` operates on (§4.2, §9). `SameStyleUnicodeRun` is
/// the only composition that requires font mapping; codepoints with no
/// mapped font are dropped with a [`TypesetError::FontMappingMissing`]
/// warning rather than aborting the paragraph (§7).
pub fn build_units<G: Clone, F: Font, M: FontMapper<F>>(
    paragraph: &PdfParagraph<G>,
    mapper: &M,
) -> Result<Vec<TypesettingUnit<G, F>>> {
    let mut units = Vec::new();
    for composition in &paragraph.compositions {
        match composition {
            Composition::Character(c) => units.push(TypesettingUnit::from_char(c.clone())),
            Composition::SameStyleCharRun(run) => {
                units.extend(run.characters.iter().cloned().map(TypesettingUnit::from_char));
            }
            Composition::Line(line) => {
                units.extend(line.characters.iter().cloned().map(TypesettingUnit::from_char));
            }
            Composition::Formula(formula) => {
                units.push(TypesettingUnit::from_formula(formula.clone()));
            }
            Composition::SameStyleUnicodeRun(run) => {
                let original_font = mapper.font_by_id(run.original_font_id).ok_or_else(|| {
                    TypesetError::InputInvariantViolation(format!(
                        "no font registered for original_font_id {:?}",
                        run.original_font_id
                    ))
                })?;
                for codepoint in run.unicode.chars() {
                    match mapper.map(original_font, codepoint as u32) {
                        Some(mapped_font) => {
                            let unit = TypesettingUnit::from_translated_str(
                                &codepoint.to_string(),
                                mapped_font,
                                run.original_font_id,
                                run.style.font_size,
                                run.style.clone(),
                                None,
                            )?;
                            units.push(unit);
                        }
                        None => {
                            let err = TypesetError::FontMappingMissing(codepoint as u32);
                            warn!(error = %err, "dropping codepoint from paragraph");
                        }
                    }
                }
            }
        }
    }
    Ok(units)
}

/// The unit-count weight a paragraph contributes to the harmonization mode
/// (§4.8 step 1): a formula contributes its character count, everything
/// else counts for one.
fn paragraph_weight<G: Clone, F: Font>(units: &[TypesettingUnit<G, F>]) -> f64 {
    units
        .iter()
        .map(|u| match &u.kind {
            crate::unit::UnitKind::Formula(f) => f.characters.len().max(1) as f64,
            _ => 1.0,
        })
        .sum()
}

fn line_skip(tunables: &LayoutTunables, target_is_cjk: bool) -> f64 {
    if target_is_cjk {
        tunables.line_skip_cjk
    } else {
        tunables.line_skip_latin
    }
}

fn paragraph_flags(paragraph: &PdfParagraph<impl Clone>, english_break_enabled: bool) -> ParagraphFlags {
    ParagraphFlags {
        first_line_indent: paragraph.first_line_indent,
        english_break_enabled,
    }
}

/// Concatenates a paragraph's composed text, for `looks_like_formula`'s
/// text-shape checks on the `preserve_line_structure` path (§9).
fn preserved_plain_text<G: Clone>(paragraph: &PdfParagraph<G>) -> String {
    let mut text = String::new();
    for composition in &paragraph.compositions {
        match composition {
            Composition::Character(c) => text.push(c.unicode),
            Composition::SameStyleCharRun(run) => {
                text.extend(run.characters.iter().map(|c| c.unicode));
            }
            Composition::Line(line) => {
                text.extend(line.characters.iter().map(|c| c.unicode));
            }
            Composition::SameStyleUnicodeRun(run) => text.push_str(&run.unicode),
            Composition::Formula(_) => {}
        }
    }
    text
}

/// Preprocess pass (§4.8 step 1): runs `ScaleSearch` against the paragraph's
/// own box with no knowledge of page-level obstacles, and records the scale
/// it would settle on along with its harmonization weight. Never aborts the
/// document: a paragraph whose units cannot be built falls back to
/// `optimal_scale = 1.0` with a logged [`TypesetError::PreScaleFailure`].
pub fn preprocess_paragraph<G: Clone, F: Font, M: FontMapper<F>>(
    paragraph: &PdfParagraph<G>,
    mapper: &M,
    tunables: &LayoutTunables,
    target_is_cjk: bool,
) -> ParagraphScale {
    if paragraph.preserve_line_structure {
        // Never reflowed, so it never participates in `ScaleSearch`; it
        // carries zero weight into the harmonization mode unless it looks
        // like a formula, mirroring `paragraph_weight`'s formula handling.
        let plain_text = preserved_plain_text(paragraph);
        let weight = if paragraph.looks_like_formula(&plain_text) {
            plain_text.chars().count().max(1) as f64
        } else {
            0.0
        };
        return ParagraphScale { optimal_scale: 1.0, weight };
    }
    let units = match build_units(paragraph, mapper) {
        Ok(units) => units,
        Err(e) => {
            let failure = TypesetError::PreScaleFailure(e.to_string());
            warn!(error = %failure, "defaulting to scale 1.0");
            return ParagraphScale { optimal_scale: 1.0, weight: 1.0 };
        }
    };
    if units.is_empty() {
        return ParagraphScale { optimal_scale: 1.0, weight: 1.0 };
    }
    let empty_probe = SpaceProbe::new(vec![]);
    let flags = paragraph_flags(paragraph, true);
    let weight = paragraph_weight(&units);
    let outcome = scale_search::search(
        &units,
        &paragraph.box_,
        tunables.initial_preprocess_scale,
        line_skip(tunables, target_is_cjk),
        flags,
        mapper.base_font(),
        units.first().map(|u| u.height).unwrap_or(tunables.fallback_line_height),
        tunables,
        &empty_probe,
        &paragraph.box_,
    );
    ParagraphScale { optimal_scale: outcome.scale, weight }
}

/// Re-emits a `preserve_line_structure` paragraph's existing lines/characters
/// unchanged (§3): `TypesettingUnit::passthrough` already returns `Char`/
/// `Formula` geometry untouched, so the structured path just skips
/// `ScaleSearch`/`linebreak::layout` entirely and drains straight to it
/// rather than relocating anything.
fn render_preserved_paragraph<G: Clone, F: Font, M: FontMapper<F>>(
    paragraph: &mut PdfParagraph<G>,
    mapper: &M,
) -> Result<(Vec<PdfCurve<G>>, Vec<PdfForm<G>>)> {
    let units = build_units(paragraph, mapper)?;
    let mut characters = Vec::with_capacity(units.len());
    let mut curves = Vec::new();
    let mut forms = Vec::new();
    for unit in &units {
        let (mut cs, mut cv, mut fm) = unit.passthrough()?;
        characters.append(&mut cs);
        curves.append(&mut cv);
        forms.append(&mut fm);
    }
    render_order::assign(&mut characters, paragraph.render_order);
    paragraph.scale = Some(1.0);
    paragraph.compositions = characters.into_iter().map(Composition::Character).collect();
    Ok((curves, forms))
}

/// Render pass (§4.8 step 4, §4.9): lays the paragraph out for real against
/// the page's `SpaceProbe` and `cropbox`, flattens it to single-character
/// compositions, and stamps render order. `main_render_order` comes from
/// `paragraph.render_order`. A `preserve_line_structure` paragraph (§3) never
/// reaches `ScaleSearch`; it is re-emitted unchanged instead.
pub fn render_paragraph<G: Clone, F: Font, M: FontMapper<F>>(
    paragraph: &mut PdfParagraph<G>,
    mapper: &M,
    probe: &SpaceProbe,
    cropbox: &Box,
    tunables: &LayoutTunables,
    target_is_cjk: bool,
) -> Result<(Vec<PdfCurve<G>>, Vec<PdfForm<G>>)> {
    if paragraph.preserve_line_structure {
        return render_preserved_paragraph(paragraph, mapper);
    }
    let units = build_units(paragraph, mapper)?;
    if units.is_empty() {
        return Ok((vec![], vec![]));
    }
    let initial_scale = paragraph.optimal_scale.unwrap_or(tunables.initial_preprocess_scale);
    let flags = paragraph_flags(paragraph, true);
    let base_font_size = units.first().map(|u| u.height).unwrap_or(tunables.fallback_line_height);

    let outcome = scale_search::search(
        &units,
        &paragraph.box_,
        initial_scale,
        line_skip(tunables, target_is_cjk),
        flags,
        mapper.base_font(),
        base_font_size,
        tunables,
        probe,
        cropbox,
    );
    if !outcome.all_fit {
        let err = TypesetError::LayoutInfeasible;
        warn!(error = %err, render_order = paragraph.render_order, "committing overflowing layout");
    }
    paragraph.scale = Some(outcome.scale);
    paragraph.box_ = outcome.box_;

    let mut characters = Vec::with_capacity(outcome.positioned.len());
    let mut curves = Vec::new();
    let mut forms = Vec::new();
    for positioned in &outcome.positioned {
        let (mut cs, mut cv, mut fm) = positioned.render()?;
        characters.append(&mut cs);
        curves.append(&mut cv);
        forms.append(&mut fm);
    }
    render_order::assign(&mut characters, paragraph.render_order);

    paragraph.compositions = characters.into_iter().map(Composition::Character).collect();
    Ok((curves, forms))
}

/// Runs the full §2 pipeline for one page: overlap correction (§4.7) over
/// its paragraph boxes, harmonization (§4.8) over the preprocessed scales,
/// and finally the sequential render pass (§4.9) for each paragraph.
/// Checked once for cancellation before the render pass begins; returns
/// [`TypesetError::Cancelled`] without mutating any paragraph if it has
/// already fired.
pub fn typeset_page<G: Clone, F: Font, M: FontMapper<F>, C: CancellationToken>(
    page: &mut Page<F, G>,
    mapper: &M,
    tunables: &LayoutTunables,
    target_is_cjk: bool,
    cancellation: &C,
) -> Result<()> {
    let mut boxes: Vec<Box> = page.paragraphs.iter().map(|p| p.box_).collect();
    let overlap_warnings = overlap::correct_overlaps(&mut boxes, tunables);
    for w in &overlap_warnings {
        warn!(error = %w, "overlap correction failed for a paragraph on this page");
    }
    for (paragraph, box_) in page.paragraphs.iter_mut().zip(boxes) {
        paragraph.box_ = box_;
    }

    let mut scales: Vec<ParagraphScale> = page
        .paragraphs
        .iter()
        .map(|p| preprocess_paragraph(p, mapper, tunables, target_is_cjk))
        .collect();
    harmonize::harmonize(&mut scales);
    for (paragraph, scale) in page.paragraphs.iter_mut().zip(&scales) {
        // A preserved paragraph never reflows, so it is never clamped to
        // the document's harmonized scale (§3); it stays at 1.0 regardless
        // of what the mode settled on.
        paragraph.optimal_scale = Some(if paragraph.preserve_line_structure {
            1.0
        } else {
            scale.optimal_scale
        });
    }

    if cancellation.is_cancelled() {
        return Err(TypesetError::Cancelled);
    }

    // `SpaceProbe` must treat every other paragraph on the page as an
    // obstacle too (§4.5), not just characters/figures, or box expansion can
    // grow one paragraph straight into a sibling's footprint. Rebuilt per
    // paragraph since each index excludes a different box (itself) and
    // earlier paragraphs in iteration order have already committed their
    // final geometry.
    let base_obstacles: Vec<Box> = page.obstacle_boxes().copied().collect();

    for i in 0..page.paragraphs.len() {
        let mut obstacles = base_obstacles.clone();
        obstacles.extend(
            page.paragraphs
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, p)| p.box_),
        );
        let probe = SpaceProbe::new(obstacles);
        let (mut curves, mut forms) =
            render_paragraph(&mut page.paragraphs[i], mapper, &probe, &page.cropbox, tunables, target_is_cjk)?;
        page.curves.append(&mut curves);
        page.forms.append(&mut forms);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fontmap::fake::{FakeFont, FakeFontMapper};
    use crate::fontmap::FontId;
    use crate::model::{LineRun, PdfCharacter, PdfStyle, SameStyleUnicodeRun};
    use pretty_assertions::assert_eq;

    fn page_with_one_paragraph() -> Page<FakeFont, ()> {
        let paragraph = PdfParagraph {
            box_: Box::new(0.0, 0.0, 100.0, 20.0),
            compositions: vec![Composition::SameStyleUnicodeRun(SameStyleUnicodeRun {
                unicode: "hello".to_string(),
                style: PdfStyle { font_id: FontId(0), font_size: 10.0, graphic_state: () },
                original_font_id: FontId(0),
            })],
            xobj_id: None,
            first_line_indent: false,
            preserve_line_structure: false,
            render_order: 3,
            optimal_scale: None,
            scale: None,
        };
        Page {
            cropbox: Box::new(0.0, 0.0, 200.0, 200.0),
            paragraphs: vec![paragraph],
            characters: vec![],
            figures: vec![],
            curves: vec![],
            forms: vec![],
            fonts: vec![],
            xobjects: vec![],
        }
    }

    #[test]
    fn typeset_page_flattens_run_into_ordered_characters() {
        let mapper = FakeFontMapper::monospace(1.0);
        let tunables = LayoutTunables::default();
        let mut page = page_with_one_paragraph();
        typeset_page(&mut page, &mapper, &tunables, false, &()).unwrap();

        let paragraph = &page.paragraphs[0];
        assert_eq!(paragraph.compositions.len(), 5);
        let orders: Vec<i64> = paragraph
            .compositions
            .iter()
            .map(|c| match c {
                Composition::Character(ch) => ch.sub_render_order.unwrap(),
                _ => panic!("expected flattened characters"),
            })
            .collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        for c in &paragraph.compositions {
            if let Composition::Character(ch) = c {
                assert_eq!(ch.main_render_order, Some(3));
            }
        }
    }

    struct AlwaysCancelled;
    impl CancellationToken for AlwaysCancelled {
        fn is_cancelled(&self) -> bool {
            true
        }
    }

    #[test]
    fn cancellation_before_render_leaves_paragraph_unrendered() {
        let mapper = FakeFontMapper::monospace(1.0);
        let tunables = LayoutTunables::default();
        let mut page = page_with_one_paragraph();
        let err = typeset_page(&mut page, &mapper, &tunables, false, &AlwaysCancelled).unwrap_err();
        assert!(matches!(err, TypesetError::Cancelled));
        assert!(matches!(page.paragraphs[0].compositions[0], Composition::SameStyleUnicodeRun(_)));
    }

    #[test]
    fn rendered_characters_stay_within_the_paragraph_box() {
        let mapper = FakeFontMapper::monospace(1.0);
        let tunables = LayoutTunables::default();
        let mut page = page_with_one_paragraph();
        typeset_page(&mut page, &mapper, &tunables, false, &()).unwrap();

        let paragraph = &page.paragraphs[0];
        for c in &paragraph.compositions {
            if let Composition::Character(ch) = c {
                assert!(paragraph.box_.contains_box(&ch.box_, 1e-6));
            }
        }
    }

    fn line_char(id: i64, unicode: char, x: f64, y: f64, w: f64, h: f64) -> PdfCharacter<()> {
        PdfCharacter {
            id,
            unicode,
            box_: Box::new(x, y, x + w, y + h),
            style: PdfStyle { font_id: FontId(0), font_size: 10.0, graphic_state: () },
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
    fn preserve_line_structure_paragraph_is_emitted_unchanged() {
        let mapper = FakeFontMapper::monospace(1.0);
        let tunables = LayoutTunables::default();
        let original = line_char(7, 'x', 1.0, 2.0, 5.0, 10.0);
        let paragraph = PdfParagraph {
            box_: Box::new(0.0, 0.0, 100.0, 20.0),
            compositions: vec![Composition::Line(LineRun { characters: vec![original.clone()] })],
            xobj_id: None,
            first_line_indent: false,
            preserve_line_structure: true,
            render_order: 9,
            optimal_scale: None,
            scale: None,
        };
        let mut page = Page {
            cropbox: Box::new(0.0, 0.0, 200.0, 200.0),
            paragraphs: vec![paragraph],
            characters: vec![],
            figures: vec![],
            curves: vec![],
            forms: vec![],
            fonts: vec![],
            xobjects: vec![],
        };
        typeset_page(&mut page, &mapper, &tunables, false, &()).unwrap();

        let paragraph = &page.paragraphs[0];
        assert_eq!(paragraph.scale, Some(1.0));
        assert_eq!(paragraph.optimal_scale, Some(1.0));
        match &paragraph.compositions[0] {
            Composition::Character(ch) => {
                assert_eq!(ch.box_, original.box_);
                assert_eq!(ch.id, original.id);
                assert_eq!(ch.sub_render_order, Some(1));
                assert_eq!(ch.main_render_order, Some(9));
            }
            other => panic!("expected a flattened character, got {other:?}"),
        }
    }

    #[test]
    fn preserved_box_is_excluded_from_its_own_space_probe_obstacles() {
        // A two-paragraph page where the reflowed paragraph's preprocessed
        // box sits directly above the preserved paragraph's box: overlap
        // correction (§4.7) should separate them, and the reflowed
        // paragraph's own box must never appear as an obstacle against
        // itself.
        let mapper = FakeFontMapper::monospace(1.0);
        let tunables = LayoutTunables::default();
        let reflowed = PdfParagraph {
            box_: Box::new(0.0, 50.0, 100.0, 70.0),
            compositions: vec![Composition::SameStyleUnicodeRun(SameStyleUnicodeRun {
                unicode: "hi".to_string(),
                style: PdfStyle { font_id: FontId(0), font_size: 10.0, graphic_state: () },
                original_font_id: FontId(0),
            })],
            xobj_id: None,
            first_line_indent: false,
            preserve_line_structure: false,
            render_order: 1,
            optimal_scale: None,
            scale: None,
        };
        let preserved = PdfParagraph {
            box_: Box::new(0.0, 0.0, 100.0, 20.0),
            compositions: vec![Composition::Line(LineRun {
                characters: vec![line_char(1, 'x', 0.0, 0.0, 5.0, 10.0)],
            })],
            xobj_id: None,
            first_line_indent: false,
            preserve_line_structure: true,
            render_order: 2,
            optimal_scale: None,
            scale: None,
        };
        let mut page = Page {
            cropbox: Box::new(0.0, 0.0, 200.0, 200.0),
            paragraphs: vec![reflowed, preserved],
            characters: vec![],
            figures: vec![],
            curves: vec![],
            forms: vec![],
            fonts: vec![],
            xobjects: vec![],
        };
        typeset_page(&mut page, &mapper, &tunables, false, &()).unwrap();
        assert_eq!(page.paragraphs[1].compositions.len(), 1);
    }
}
