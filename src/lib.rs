// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A paragraph typesetting core: reflows translated text back into PDF page
//! geometry.
//!
//! Some key types are:
//! - [`TypesettingUnit`] is the atomic layout element — a character, an
//!   embedded formula, or a single translated codepoint not yet mapped to a
//!   glyph.
//! - [`scale_search::search`] finds the largest font scale at which a
//!   paragraph's units fit their box, trading scale against box expansion
//!   against line-break relaxation.
//! - [`document::typeset_page`] drives the full per-page pipeline: overlap
//!   correction, scale harmonization, and render-order assignment.
//! - [`FontMapper`] is the external collaborator the core asks for font
//!   metrics and codepoint-to-font resolution; callers provide a concrete
//!   implementation, the core never touches glyph outlines or subsetting
//!   itself.
//!
//! ## Usage example
//!
//! ```rust,ignore
//! use typeset_core::{document, LayoutTunables};
//!
//! // `font_mapper` is supplied by the caller; see the `FontMapper` trait.
//! let tunables = LayoutTunables::default();
//! document::typeset_page(&mut page, &font_mapper, &tunables, false, &())?;
//! ```

// TYPESET-CORE LINT SET
// These lints shouldn't apply to tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![warn(missing_debug_implementations)]

pub mod classify;
pub mod document;
pub mod error;
pub mod fontmap;
pub mod formula;
pub mod geometry;
pub mod harmonize;
pub mod linebreak;
pub mod model;
pub mod overlap;
pub mod render_order;
pub mod scale_search;
pub mod space_probe;
pub mod stats;
pub mod tunables;
pub mod unit;

pub use error::{Result, TypesetError};
pub use fontmap::{Font, FontId, FontMapper};
pub use geometry::Box;
pub use tunables::LayoutTunables;
pub use unit::TypesettingUnit;
