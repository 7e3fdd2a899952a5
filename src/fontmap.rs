// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `FontMapper` boundary (§6). Font resolution and subsetting are an
//! external collaborator: the core only ever asks "what font does this
//! translated codepoint map to" and "how wide is this glyph". Callers
//! provide a concrete implementation; the core is generic over it through
//! this trait so it never needs to know about glyph outlines, subsetting,
//! or PDF font dictionaries.

use core::fmt::Debug;
use core::hash::Hash;

/// A resolved font as far as the typesetting core is concerned: it can
/// report advance widths and glyph ids, nothing more.
pub trait Font: Clone + Debug {
    /// Unique id of this font within a page's font table.
    fn id(&self) -> FontId;

    /// Advance width of `codepoint` set at `size`, in user-space units.
    fn advance(&self, codepoint: u32, size: f64) -> f64;

    /// Glyph id to emit into the output `PdfCharacter` for `codepoint`.
    fn glyph_id(&self, codepoint: u32) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u64);

/// Maps an original font + translated codepoint to the font that should
/// render it, and exposes metrics for that mapped font.
pub trait FontMapper<F: Font> {
    /// The base (fallback) font used e.g. for inter-unit glue width
    /// computation.
    fn base_font(&self) -> &F;

    /// Resolves the font to use for `codepoint`, originally styled with
    /// `original_font`. Returns `None` if no font can render it
    /// (`FontMappingMissing`, §7).
    fn map(&self, original_font: &F, codepoint: u32) -> Option<F>;

    fn font_by_id(&self, id: FontId) -> Option<&F>;
}

/// Convenience: width of a single space glyph in `font` at `size`.
pub fn space_width<F: Font>(font: &F, size: f64) -> f64 {
    font.advance(0x20, size)
}

#[cfg(test)]
pub(crate) mod fake {
    //! A minimal monospace `FontMapper` used across the test suite, standing
    //! in for the real font subsystem the way `parley`'s `tests/utils`
    //! builds a fake font context for layout snapshot tests.
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    pub struct FakeFont {
        pub id: FontId,
        pub advance_per_em: f64,
    }

    impl Font for FakeFont {
        fn id(&self) -> FontId {
            self.id
        }

        fn advance(&self, _codepoint: u32, size: f64) -> f64 {
            self.advance_per_em * size
        }

        fn glyph_id(&self, codepoint: u32) -> i64 {
            codepoint as i64
        }
    }

    #[derive(Debug, Clone)]
    pub struct FakeFontMapper {
        pub base: FakeFont,
        pub fonts: HashMap<u64, FakeFont>,
        pub missing: std::collections::HashSet<u32>,
    }

    impl FakeFontMapper {
        pub fn monospace(advance_per_em: f64) -> Self {
            let base = FakeFont {
                id: FontId(0),
                advance_per_em,
            };
            let mut fonts = HashMap::new();
            fonts.insert(0, base.clone());
            Self {
                base,
                fonts,
                missing: Default::default(),
            }
        }
    }

    impl FontMapper<FakeFont> for FakeFontMapper {
        fn base_font(&self) -> &FakeFont {
            &self.base
        }

        fn map(&self, original_font: &FakeFont, codepoint: u32) -> Option<FakeFont> {
            if self.missing.contains(&codepoint) {
                return None;
            }
            Some(self.fonts.get(&original_font.id.0).cloned().unwrap_or_else(|| self.base.clone()))
        }

        fn font_by_id(&self, id: FontId) -> Option<&FakeFont> {
            self.fonts.get(&id.0)
        }
    }
}
