// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `TypesettingUnit` (§4.2): the atomic layout element. Modeled as a tagged
//! variant over exactly three cases rather than a trait-object hierarchy —
//! the operations (`box`, `width`, `relocate`, `render`, `passthrough`,
//! predicates) are closed and exhaustively pattern-matched, per the design
//! note in §9. Cached predicates are computed once, eagerly, at
//! construction (also per §9) rather than memoized behind a global cache
//! keyed by Unicode scalar.

use crate::classify;
use crate::error::{Result, TypesetError};
use crate::fontmap::{Font, FontId};
use crate::formula;
use crate::geometry::Box;
use crate::model::{PdfCharacter, PdfCurve, PdfForm, PdfFormula, PdfStyle};
use crate::tunables::LayoutTunables;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Predicates {
    pub is_cjk: bool,
    pub can_break_line: bool,
    pub is_space: bool,
    pub is_hung_punctuation: bool,
    pub is_leading_punctuation: bool,
    pub mixed_blacklist: bool,
}

impl Predicates {
    fn for_char(c: char) -> Self {
        Self {
            is_cjk: classify::is_cjk(c),
            can_break_line: classify::can_break_line(c),
            is_space: classify::is_space(c),
            is_hung_punctuation: classify::is_hung_punctuation(c),
            is_leading_punctuation: classify::is_leading_punctuation(c),
            mixed_blacklist: classify::mixed_character_blacklist(c),
        }
    }

    /// Formulas (and anything not a single character) are breakable and
    /// otherwise inert with respect to the script-mixing predicates.
    fn for_non_character() -> Self {
        Self {
            is_cjk: false,
            can_break_line: true,
            is_space: false,
            is_hung_punctuation: false,
            is_leading_punctuation: false,
            mixed_blacklist: false,
        }
    }
}

/// Where a `Translated` unit ended up after `relocate`; consumed by
/// `render`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

#[derive(Debug, Clone)]
pub struct TranslatedGlyph<G: Clone, F: Font> {
    pub codepoint: char,
    pub mapped_font: F,
    pub original_font_id: FontId,
    pub font_size: f64,
    pub style: PdfStyle<G>,
    pub xobj_id: Option<i64>,
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone)]
pub enum UnitKind<G: Clone, F: Font> {
    Char(PdfCharacter<G>),
    Formula(PdfFormula<G>),
    Translated(TranslatedGlyph<G, F>),
}

#[derive(Debug, Clone)]
pub struct TypesettingUnit<G: Clone, F: Font> {
    pub kind: UnitKind<G, F>,
    pub box_: Box,
    pub width: f64,
    pub height: f64,
    pub can_passthrough: bool,
    pub unicode: Option<char>,
    pub predicates: Predicates,
}

impl<G: Clone, F: Font> TypesettingUnit<G, F> {
    pub fn from_char(character: PdfCharacter<G>) -> Self {
        let box_ = character.layout_box();
        let predicates = Predicates::for_char(character.unicode);
        Self {
            width: box_.width(),
            height: box_.height(),
            box_,
            can_passthrough: true,
            unicode: Some(character.unicode),
            predicates,
            kind: UnitKind::Char(character),
        }
    }

    pub fn from_formula(formula: PdfFormula<G>) -> Self {
        let box_ = formula.box_;
        Self {
            width: box_.width(),
            height: box_.height(),
            box_,
            can_passthrough: true,
            unicode: None,
            predicates: Predicates::for_non_character(),
            kind: UnitKind::Formula(formula),
        }
    }

    /// Builds a `Translated` unit from a single-codepoint string, as the
    /// document IL stores a `SameStyleUnicodeRun`'s text. Returns
    /// `InputInvariantViolation` if `unicode` is not exactly one scalar.
    pub fn from_translated_str(
        unicode: &str,
        mapped_font: F,
        original_font_id: FontId,
        font_size: f64,
        style: PdfStyle<G>,
        xobj_id: Option<i64>,
    ) -> Result<Self> {
        let mut chars = unicode.chars();
        let codepoint = chars.next().ok_or_else(|| {
            TypesetError::InputInvariantViolation(
                "translated unit unicode string is empty".into(),
            )
        })?;
        if chars.next().is_some() {
            return Err(TypesetError::InputInvariantViolation(format!(
                "translated unit unicode string {unicode:?} has length != 1"
            )));
        }
        let width = mapped_font.advance(codepoint as u32, font_size);
        let height = font_size;
        Ok(Self {
            width,
            height,
            box_: Box::new(0.0, 0.0, width, height),
            can_passthrough: false,
            unicode: Some(codepoint),
            predicates: Predicates::for_char(codepoint),
            kind: UnitKind::Translated(TranslatedGlyph {
                codepoint,
                mapped_font,
                original_font_id,
                font_size,
                style,
                xobj_id,
                placement: None,
            }),
        })
    }

    /// Emits this unit's final geometry unchanged. Errors for `Translated`
    /// units, which must be `render`ed instead.
    pub fn passthrough(&self) -> Result<(Vec<PdfCharacter<G>>, Vec<PdfCurve<G>>, Vec<PdfForm<G>>)> {
        match &self.kind {
            UnitKind::Char(c) => Ok((vec![c.clone()], vec![], vec![])),
            UnitKind::Formula(f) => Ok((f.characters.clone(), f.curves.clone(), f.forms.clone())),
            UnitKind::Translated(_) => Err(TypesetError::InputInvariantViolation(
                "Translated unit cannot be passed through; it must be rendered".into(),
            )),
        }
    }

    /// Produces a new unit positioned with bottom-left at `(x, y)` and
    /// scaled by `s` (§4.2).
    pub fn relocate(&self, x: f64, y: f64, s: f64, tunables: &LayoutTunables) -> Self {
        match &self.kind {
            UnitKind::Char(c) => {
                let w = self.box_.width() * s;
                let h = self.box_.height() * s;
                let mut relocated = c.clone();
                relocated.box_ = Box::new(x, y, x + w, y + h);
                relocated.style.font_size *= s;
                relocated.scale *= s;
                relocated.advance *= s;
                relocated.visual_bbox = None;
                let box_ = relocated.box_;
                Self {
                    width: w,
                    height: h,
                    box_,
                    can_passthrough: true,
                    unicode: self.unicode,
                    predicates: self.predicates,
                    kind: UnitKind::Char(relocated),
                }
            }
            UnitKind::Formula(f) => {
                let relocated = formula::relocate_formula(f, x, y, s, tunables);
                let box_ = relocated.box_;
                Self {
                    width: box_.width(),
                    height: box_.height(),
                    box_,
                    can_passthrough: true,
                    unicode: None,
                    predicates: Predicates::for_non_character(),
                    kind: UnitKind::Formula(relocated),
                }
            }
            UnitKind::Translated(t) => {
                let w = self.width * s;
                let h = self.height * s;
                let mut relocated = t.clone();
                relocated.placement = Some(Placement { x, y, scale: s });
                Self {
                    width: w,
                    height: h,
                    box_: Box::new(x, y, x + w, y + h),
                    can_passthrough: false,
                    unicode: self.unicode,
                    predicates: self.predicates,
                    kind: UnitKind::Translated(relocated),
                }
            }
        }
    }

    /// Emits final `PdfCharacter`s (and any curves/forms). `Char`/`Formula`
    /// delegate to `passthrough`; `Translated` emits a single character at
    /// its placed position, sized by `font_size * scale`, with its id set
    /// from `mapped_font.glyph_id(codepoint)` (§4.2).
    pub fn render(&self) -> Result<(Vec<PdfCharacter<G>>, Vec<PdfCurve<G>>, Vec<PdfForm<G>>)> {
        match &self.kind {
            UnitKind::Char(_) | UnitKind::Formula(_) => self.passthrough(),
            UnitKind::Translated(t) => {
                let placement = t.placement.ok_or_else(|| {
                    TypesetError::InputInvariantViolation(
                        "Translated unit rendered before relocate".into(),
                    )
                })?;
                let size = t.font_size * placement.scale;
                let character = PdfCharacter {
                    id: t.mapped_font.glyph_id(t.codepoint as u32),
                    unicode: t.codepoint,
                    box_: Box::new(
                        placement.x,
                        placement.y,
                        placement.x + self.width,
                        placement.y + size,
                    ),
                    style: PdfStyle {
                        font_id: t.mapped_font.id(),
                        font_size: size,
                        graphic_state: t.style.graphic_state.clone(),
                    },
                    scale: placement.scale,
                    vertical: false,
                    advance: self.width,
                    xobj_id: t.xobj_id,
                    visual_bbox: None,
                    main_render_order: None,
                    sub_render_order: None,
                };
                Ok((vec![character], vec![], vec![]))
            }
        }
    }
}
