// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error kinds for the typesetting core (§7).
//!
//! Only [`TypesetError::InputInvariantViolation`] and
//! [`TypesetError::Cancelled`] are meant to escape a paragraph/page entry
//! point as an `Err`. The other variants are constructed, logged with
//! `tracing::warn!`, and then recovered from in place — the document loop
//! always produces output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesetError {
    /// A unit was constructed with more than one discriminant, a translated
    /// unit is missing its font/style, or a translated unit's codepoint
    /// string has length != 1. Programmer error; aborts the paragraph.
    #[error("input invariant violated: {0}")]
    InputInvariantViolation(String),

    /// A translated codepoint has no mapped font. The unit is filtered out
    /// with a warning; layout continues.
    #[error("no mapped font for codepoint U+{0:04X}")]
    FontMappingMissing(u32),

    /// `ScaleSearch` exhausted to `scale = 0.1` without a fit, even after box
    /// expansion and English-break relaxation. The last attempted layout is
    /// committed anyway.
    #[error("layout infeasible for paragraph after exhausting scale search")]
    LayoutInfeasible,

    /// A paragraph's preprocess pass threw; `optimal_scale` falls back to
    /// 1.0.
    #[error("pre-scale failed for paragraph: {0}")]
    PreScaleFailure(String),

    /// The §4.7 overlap correction pass threw for a page; the page is
    /// rendered without that page's adjustment.
    #[error("overlap adjustment failed for page: {0}")]
    OverlapAdjustFailure(String),

    /// The document-level cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = core::result::Result<T, TypesetError>;
