// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-character Unicode predicates (§4.1). Every function here is a pure,
//! total function of a single `char` — no allocation, no lookup table
//! beyond `match` over literal ranges. Per the design notes (§9), we do not
//! memoize globally keyed by scalar: the predicate set is small and
//! branch-predictable, so callers (`TypesettingUnit::new`, §4.2) compute
//! each predicate once, eagerly, and store the result on the short-lived
//! unit instead.

/// True iff `c` falls in a CJK/Hiragana/Katakana/Hangul/Bopomofo/Kanbun/
/// CJK-Compatibility block, is one of the fixed fullwidth brackets/marks
/// below, or — for characters outside those explicit ranges — still reads
/// as a CJK ideograph or fullwidth form. The open interval list below
/// covers the blocks named by their Unicode range ("CJK UNIFIED IDEOGRAPH",
/// "FULLWIDTH"); see `DESIGN.md` for why we match by block instead of
/// scanning Unicode character names at runtime.
pub fn is_cjk(c: char) -> bool {
    const FULLWIDTH_BRACKETS: &[char] = &[
        '（', '）', '【', '】', '《', '》', '〔', '〕', '〈', '〉', '〖', '〗', '「', '」', '『',
        '』', '、', '。', '：', '？', '！', '，',
    ];
    if FULLWIDTH_BRACKETS.contains(&c) {
        return true;
    }
    let cp = c as u32;
    matches!(cp,
        0x2E80..=0x2EFF   // CJK Radicals Supplement
        | 0x2F00..=0x2FDF // Kangxi Radicals
        | 0x3000..=0x303F // CJK Symbols and Punctuation
        | 0x3040..=0x309F // Hiragana
        | 0x30A0..=0x30FF // Katakana
        | 0x3100..=0x312F // Bopomofo
        | 0x3130..=0x318F // Hangul Compatibility Jamo
        | 0x3190..=0x319F // Kanbun
        | 0x31A0..=0x31BF // Bopomofo Extended
        | 0x31C0..=0x31EF // CJK Strokes
        | 0x31F0..=0x31FF // Katakana Phonetic Extensions
        | 0x3200..=0x32FF // Enclosed CJK Letters and Months
        | 0x3300..=0x33FF // CJK Compatibility
        | 0x3400..=0x4DBF // CJK Unified Ideographs Extension A
        | 0x4E00..=0x9FFF // CJK Unified Ideographs
        | 0xA960..=0xA97F // Hangul Jamo Extended-A
        | 0xAC00..=0xD7A3 // Hangul Syllables
        | 0xD7B0..=0xD7FF // Hangul Jamo Extended-B
        | 0xF900..=0xFAFF // CJK Compatibility Ideographs
        | 0xFF00..=0xFFEF // Halfwidth and Fullwidth Forms
        | 0x20000..=0x2FA1F // CJK Unified Ideographs Extension B..F + Compat Supplement
    )
}

/// False iff `c` belongs to a script that must not be split mid-word: Latin
/// (all supplements), IPA, Cyrillic (all blocks), Greek, Armenian,
/// Georgian, Thai, Lao, Myanmar (all), Khmer, Ethiopic (all), Malayalam,
/// Gujarati, Tamil, Telugu, Oriya, Thaana, Adlam, Yi, Canadian Syllabics,
/// combining diacriticals, apostrophe, hyphen, middle-dot, or modifier
/// apostrophe. Everything else — including CJK, and anything not a single
/// character — is breakable.
pub fn can_break_line(c: char) -> bool {
    !is_non_breaking_script(c)
}

fn is_non_breaking_script(c: char) -> bool {
    match c {
        '\'' | '-' | '\u{00B7}' | '\u{02BB}' => return true,
        _ => {}
    }
    let cp = c as u32;
    matches!(cp,
        0x0041..=0x005A | 0x0061..=0x007A // ASCII Latin
        | 0x0030..=0x0039 // ASCII digits participate in non-breaking runs
        | 0x00C0..=0x00FF // Latin-1 Supplement
        | 0x0100..=0x017F // Latin Extended-A
        | 0x0180..=0x024F // Latin Extended-B
        | 0x1E00..=0x1EFF // Latin Extended Additional
        | 0x2C60..=0x2C7F // Latin Extended-C
        | 0xA720..=0xA7FF // Latin Extended-D
        | 0xAB30..=0xAB6F // Latin Extended-E
        | 0x0250..=0x02A0 // IPA Extensions
        | 0x0400..=0x04FF // Cyrillic
        | 0x0300..=0x036F // Combining Diacritical Marks
        | 0x0500..=0x052F // Cyrillic Supplement
        | 0x0370..=0x03FF // Greek and Coptic
        | 0x2DE0..=0x2DFF // Cyrillic Extended-A
        | 0xA650..=0xA69F // Cyrillic Extended-B
        | 0x1C80..=0x1C8F // Cyrillic Extended-C
        | 0x1E030..=0x1E08F // Cyrillic Extended-D
        | 0x1200..=0x137F // Ethiopic
        | 0x1380..=0x139F // Ethiopic Supplement
        | 0x2D80..=0x2DDF // Ethiopic Extended
        | 0xAB00..=0xAB2F // Ethiopic Extended-A
        | 0x1E7E0..=0x1E7FF // Ethiopic Extended-B
        | 0x0E80..=0x0EFF // Lao
        | 0x0D00..=0x0D7F // Malayalam
        | 0x0A80..=0x0AFF // Gujarati
        | 0x0E00..=0x0E7F // Thai
        | 0x1000..=0x109F // Myanmar
        | 0xAA60..=0xAA7F // Myanmar Extended-A
        | 0xA9E0..=0xA9FF // Myanmar Extended-B
        | 0x116D0..=0x116FF // Myanmar Extended-C
        | 0x0B80..=0x0BFF // Tamil
        | 0x0C00..=0x0C7F // Telugu
        | 0x0B00..=0x0B7F // Oriya
        | 0x0530..=0x058F // Armenian
        | 0x10A0..=0x10FF // Georgian
        | 0x1C90..=0x1CBF // Georgian Extended
        | 0x2D00..=0x2D2F // Georgian Supplement
        | 0x1780..=0x17FF // Khmer
        | 0x19E0..=0x19FF // Khmer Symbols
        | 0x10B00..=0x10B3F // Avestan
        | 0x1D00..=0x1D7F // Phonetic Extensions
        | 0x1400..=0x167F // Unified Canadian Aboriginal Syllabics
        | 0x0780..=0x07BF // Thaana
        | 0x1E900..=0x1E95F // Adlam
        | 0xA000..=0xA48F // Yi Syllables
        | 0xA490..=0xA4CF // Yi Radicals
    )
}

/// Sentence-final punctuation, closing quotes/brackets, dashes,
/// middle-dots, and slashes — allowed to overflow the right margin.
pub fn is_hung_punctuation(c: char) -> bool {
    matches!(
        c,
        '。' | '，'
            | '、'
            | '；'
            | '：'
            | '？'
            | '！'
            | '）'
            | '】'
            | '》'
            | '〕'
            | '〉'
            | '〗'
            | '」'
            | '』'
            | '"'
            | '\''
            | ')'
            | ']'
            | '}'
            | ','
            | '.'
            | ';'
            | ':'
            | '?'
            | '!'
            | '-'
            | '—'
            | '–'
            | '·'
            | '/'
            | '／'
    )
}

/// Opening quotes/brackets that must not be the last unit on a line.
pub fn is_leading_punctuation(c: char) -> bool {
    matches!(
        c,
        '（' | '【' | '《' | '〔' | '〈' | '〖' | '「' | '『' | '"' | '\'' | '(' | '[' | '{'
    )
}

/// Suppresses CJK/Latin inter-script glue at boundaries touching these
/// marks.
pub fn mixed_character_blacklist(c: char) -> bool {
    matches!(c, '。' | '，' | '：' | '？' | '！')
}

pub fn is_space(c: char) -> bool {
    c == ' '
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_letters_are_non_breaking() {
        assert!(!can_break_line('a'));
        assert!(!can_break_line('Z'));
    }

    #[test]
    fn cjk_ideographs_are_breakable_and_cjk() {
        let c = '中';
        assert!(is_cjk(c));
        assert!(can_break_line(c));
    }

    #[test]
    fn hyphen_and_middle_dot_are_non_breaking() {
        assert!(!can_break_line('-'));
        assert!(!can_break_line('\u{00B7}'));
    }

    #[test]
    fn predicates_are_total_over_a_wide_sample() {
        for cp in (0u32..0x3000).step_by(37) {
            if let Some(c) = char::from_u32(cp) {
                let _ = (
                    is_cjk(c),
                    can_break_line(c),
                    is_hung_punctuation(c),
                    is_leading_punctuation(c),
                    mixed_character_blacklist(c),
                    is_space(c),
                );
            }
        }
    }

    #[test]
    fn space_is_only_u0020() {
        assert!(is_space(' '));
        assert!(!is_space('\u{00A0}'));
        assert!(!is_space('\t'));
    }
}
