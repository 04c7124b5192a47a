//! Locale-aware string ordering for display names.
//!
//! Names are compared in three levels, in the spirit of the Unicode collation
//! algorithm's default ordering: base letters (accents and case ignored), then
//! accents, then case with lowercase first. Raw code point order breaks any
//! remaining tie so the ordering is total and sorting is reproducible.

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub fn compare(a: &str, b: &str) -> Ordering {
    base_key(a)
        .cmp(&base_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
        .then_with(|| a.cmp(b))
}

fn base_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn accent_key(s: &str) -> String {
    s.nfd().flat_map(char::to_lowercase).collect()
}

fn case_key(s: &str) -> Vec<bool> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
        .collect()
}
