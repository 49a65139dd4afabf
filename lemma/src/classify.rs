//! Spellings that are never lemmatized.

use once_cell::sync::Lazy;
use regex::Regex;

static ALL_HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-\x{2011}]+$").unwrap());

// Punctuation other than hyphen and apostrophe. The backtick and the small
// black square are treated as punctuation too.
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[[\p{P}\p{Me}\p{Zp}`\x{25AA}]&&[^'\-]]").unwrap());

static SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{S}\p{Co}]").unwrap());

static LOOSE_ROMAN_NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.?[MDCLXVI]+\.?$").unwrap());

static LOOSE_ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[MDCLXVI]+(?i:st|nd|rd|th|d)\.?$").unwrap());

pub fn is_all_hyphens(s: &str) -> bool {
    ALL_HYPHENS.is_match(s)
}

/// True if `s` has punctuation other than `-` and `'`.
pub fn has_punctuation(s: &str) -> bool {
    PUNCTUATION.is_match(s)
}

pub fn has_symbol(s: &str) -> bool {
    SYMBOL.is_match(s)
}

/// True if `s` parses as a decimal number. Spelled-out values such as
/// `inf` or `NaN` are words, not numbers.
pub fn is_number(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit()) && s.parse::<f64>().is_ok()
}

/// Upper case Roman numeral with optional leading and trailing periods.
pub fn is_loose_roman_numeral(s: &str) -> bool {
    LOOSE_ROMAN_NUMERAL.is_match(s)
}

/// Roman numeral with an ordinal suffix, e.g. `XIVth` or `IId.`
pub fn is_loose_ordinal(s: &str) -> bool {
    LOOSE_ORDINAL.is_match(s)
}

/// Strip one leading and one trailing period from a loose Roman numeral.
pub fn strip_roman_periods(s: &str) -> &str {
    if !is_loose_roman_numeral(s) {
        return s;
    }
    let s = s.strip_prefix('.').unwrap_or(s);
    s.strip_suffix('.').unwrap_or(s)
}

/// True if `spelling` should be passed through unchanged: blank, hyphens
/// only, punctuated, symbolic, numeric, or a Roman numeral.
pub fn cant_lemmatize(spelling: &str) -> bool {
    let s = spelling.trim();
    s.is_empty()
        || is_all_hyphens(s)
        || has_punctuation(s)
        || has_symbol(s)
        || is_number(s)
        || is_loose_roman_numeral(s)
        || is_loose_ordinal(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_spellings() {
        for s in ["", "   ", "---", "\u{2011}", "42", "3.14", "-7", "XIV", ".XIV.", "XIVth", "IId.", "e.g.", "a&b", "$5", "100%", "«", "a`b"] {
            assert!(cant_lemmatize(s), "{s:?}");
        }
    }

    #[test]
    fn ordinary_words() {
        for s in ["running", "don't", "well-known", "inf", "NaN", "xiv", "Mice", "Mix"] {
            assert!(!cant_lemmatize(s), "{s:?}");
        }
    }

    #[test]
    fn roman_periods() {
        assert_eq!(strip_roman_periods(".XIV."), "XIV");
        assert_eq!(strip_roman_periods("IX."), "IX");
        assert_eq!(strip_roman_periods("word."), "word.");
    }
}
