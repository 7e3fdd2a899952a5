// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document IL types the core consumes and mutates (§3, §6). These are
//! snapshots: paragraphs reference fonts only through [`FontId`], resolved
//! to a concrete [`Font`] only at the boundary where [`TypesettingUnit`]s
//! are constructed (§9 "Cyclic references").
//!
//! Every type here is generic over `G`, the caller's opaque graphic-state
//! type (clip, fill color, CTM — whatever the PDF serializer needs). The
//! core never inspects `G`; it only clones it forward, the same way
//! `parley::Layout<B: Brush>` threads a caller-supplied brush type through
//! layout without interpreting it.
//!
//! [`TypesettingUnit`]: crate::unit::TypesettingUnit

use crate::fontmap::FontId;
use crate::geometry::{Box, RelocationTransform};

/// Immutable per-character styling: which font, at what size, under what
/// graphic state.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStyle<G: Clone> {
    pub font_id: FontId,
    pub font_size: f64,
    pub graphic_state: G,
}

/// A single glyph already placed on the page (or about to be, once
/// rendered from a [`Composition::SameStyleUnicodeRun`]).
#[derive(Debug, Clone, PartialEq)]
pub struct PdfCharacter<G: Clone> {
    pub id: i64,
    pub unicode: char,
    pub box_: Box,
    pub style: PdfStyle<G>,
    pub scale: f64,
    pub vertical: bool,
    pub advance: f64,
    pub xobj_id: Option<i64>,
    /// Tight ink bounding box; may differ from `box_`, which is the layout
    /// cell.
    pub visual_bbox: Option<Box>,
    /// PDF z-order, assigned by render-order assignment (§4.9); `None`
    /// until that pass runs.
    pub main_render_order: Option<i64>,
    pub sub_render_order: Option<i64>,
}

impl<G: Clone> PdfCharacter<G> {
    /// The box used for layout decisions: `visual_bbox`'s y-extent
    /// overrides `box_`'s when present, per §4.2.
    pub fn layout_box(&self) -> Box {
        match &self.visual_bbox {
            Some(v) => Box::new(self.box_.x, v.y, self.box_.x2, v.y2),
            None => self.box_,
        }
    }
}

/// A curve (path) that may belong to a formula and get dragged along when
/// the formula is relocated.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfCurve<G: Clone> {
    pub box_: Box,
    pub graphic_state: G,
    pub relocation: Option<RelocationTransform>,
}

/// A form XObject reference, relocated the same way as curves.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfForm<G: Clone> {
    pub box_: Box,
    pub xobj_id: i64,
    pub relocation: Option<RelocationTransform>,
}

/// An embedded formula: characters plus the curves/forms that draw its
/// non-textual glyphs (radicals, fraction bars, …).
#[derive(Debug, Clone, PartialEq)]
pub struct PdfFormula<G: Clone> {
    pub box_: Box,
    pub characters: Vec<PdfCharacter<G>>,
    pub curves: Vec<PdfCurve<G>>,
    pub forms: Vec<PdfForm<G>>,
    /// Pre-relocation deltas from the formula's nominal origin to its
    /// content's top-left.
    pub x_offset: f64,
    pub y_offset: f64,
    pub x_advance: f64,
}

/// A run of existing characters sharing one style, e.g. emitted unchanged by
/// an earlier pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SameStyleCharRun<G: Clone> {
    pub characters: Vec<PdfCharacter<G>>,
}

/// Translated text with a resolved style but not yet mapped to glyphs —
/// the bulk of what paragraph rendering consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct SameStyleUnicodeRun<G: Clone> {
    pub unicode: String,
    pub style: PdfStyle<G>,
    pub original_font_id: FontId,
}

/// A previously laid-out line, carried through unreflowed (used by
/// `preserve_line_structure` paragraphs).
#[derive(Debug, Clone, PartialEq)]
pub struct LineRun<G: Clone> {
    pub characters: Vec<PdfCharacter<G>>,
}

/// One element of a paragraph's ordered content.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition<G: Clone> {
    Character(PdfCharacter<G>),
    SameStyleCharRun(SameStyleCharRun<G>),
    SameStyleUnicodeRun(SameStyleUnicodeRun<G>),
    Line(LineRun<G>),
    Formula(PdfFormula<G>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfParagraph<G: Clone> {
    pub box_: Box,
    pub compositions: Vec<Composition<G>>,
    pub xobj_id: Option<i64>,
    pub first_line_indent: bool,
    pub preserve_line_structure: bool,
    pub render_order: i64,
    pub optimal_scale: Option<f64>,
    pub scale: Option<f64>,
}

impl<G: Clone> PdfParagraph<G> {
    /// Heuristic used only on the `preserve_line_structure` path to decide
    /// whether a paragraph is "formula-like" and should be left alone
    /// rather than re-measured. Fragile by design (§9 open question);
    /// do not extend it.
    pub fn looks_like_formula(&self, plain_text: &str) -> bool {
        let has_formula_composition = self
            .compositions
            .iter()
            .any(|c| matches!(c, Composition::Formula(_)));
        let has_equals = plain_text.contains('=');
        let short_with_digits =
            plain_text.chars().count() <= 8 && plain_text.chars().any(|c| c.is_ascii_digit());
        has_formula_composition || has_equals || short_with_digits
    }
}

/// A page's elements, as consumed and mutated by the core. Font resolution
/// is keyed by [`FontId`] into `fonts`; the core looks fonts up through a
/// [`crate::fontmap::FontMapper`] rather than holding references directly.
#[derive(Debug, Clone)]
pub struct Page<F, G: Clone> {
    pub cropbox: Box,
    pub paragraphs: Vec<PdfParagraph<G>>,
    pub characters: Vec<PdfCharacter<G>>,
    pub figures: Vec<Box>,
    pub curves: Vec<PdfCurve<G>>,
    pub forms: Vec<PdfForm<G>>,
    pub fonts: Vec<F>,
    pub xobjects: Vec<i64>,
}

impl<F, G: Clone> Page<F, G> {
    /// All non-paragraph element boxes considered by `SpaceProbe`/overlap
    /// correction, in addition to other paragraphs.
    pub fn obstacle_boxes(&self) -> impl Iterator<Item = &Box> {
        self.characters
            .iter()
            .map(|c| &c.box_)
            .chain(self.figures.iter())
    }
}
