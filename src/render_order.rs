// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-order assignment (§4.9): stamps PDF z-order onto a paragraph's
//! emitted characters after layout. `main_render_order` is the paragraph's
//! position among its page's paragraphs; `sub_render_order` is each
//! character's position within the paragraph, in composition order.

use crate::model::PdfCharacter;

/// Assigns `main_render_order = main` and `sub_render_order = 1..=len` to
/// `characters`, in place, in the order given.
pub fn assign<G: Clone>(characters: &mut [PdfCharacter<G>], main: i64) {
    for (i, c) in characters.iter_mut().enumerate() {
        c.main_render_order = Some(main);
        c.sub_render_order = Some(i as i64 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fontmap::FontId;
    use crate::geometry::Box;
    use crate::model::PdfStyle;

    fn char_(id: i64) -> PdfCharacter<()> {
        PdfCharacter {
            id,
            unicode: 'a',
            box_: Box::new(0.0, 0.0, 1.0, 1.0),
            style: PdfStyle { font_id: FontId(0), font_size: 10.0, graphic_state: () },
            scale: 1.0,
            vertical: false,
            advance: 1.0,
            xobj_id: None,
            visual_bbox: None,
            main_render_order: None,
            sub_render_order: None,
        }
    }

    #[test]
    fn sub_order_is_one_indexed_and_distinct() {
        let mut chars = vec![char_(1), char_(2), char_(3)];
        assign(&mut chars, 7);
        let subs: Vec<i64> = chars.iter().map(|c| c.sub_render_order.unwrap()).collect();
        assert_eq!(subs, vec![1, 2, 3]);
        assert!(chars.iter().all(|c| c.main_render_order == Some(7)));
    }

    #[test]
    fn empty_paragraph_is_a_noop() {
        let mut chars: Vec<PdfCharacter<()>> = vec![];
        assign(&mut chars, 1);
        assert!(chars.is_empty());
    }
}
