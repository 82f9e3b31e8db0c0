//! Ordinal day numbers: `first`, `twenty-first`, `21st`, `21`.

use regex::Regex;
use std::sync::OnceLock;

/// Ordinal words and their values. Compound ordinals come with both a hyphen
/// and a space.
const ORDINAL_WORDS: &[(&str, u32)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
    ("eleventh", 11),
    ("twelfth", 12),
    ("thirteenth", 13),
    ("fourteenth", 14),
    ("fifteenth", 15),
    ("sixteenth", 16),
    ("seventeenth", 17),
    ("eighteenth", 18),
    ("nineteenth", 19),
    ("twentieth", 20),
    ("twenty first", 21),
    ("twenty-first", 21),
    ("twenty second", 22),
    ("twenty-second", 22),
    ("twenty third", 23),
    ("twenty-third", 23),
    ("twenty fourth", 24),
    ("twenty-fourth", 24),
    ("twenty fifth", 25),
    ("twenty-fifth", 25),
    ("twenty sixth", 26),
    ("twenty-sixth", 26),
    ("twenty seventh", 27),
    ("twenty-seventh", 27),
    ("twenty eighth", 28),
    ("twenty-eighth", 28),
    ("twenty ninth", 29),
    ("twenty-ninth", 29),
    ("thirtieth", 30),
    ("thirty first", 31),
    ("thirty-first", 31),
];

/// Regex alternation matching any ordinal word or a one/two digit number
/// with an optional `st`/`nd`/`rd`/`th` suffix.
///
/// Longer words come first so `twenty-first` is not cut short at `twenty`.
#[must_use]
pub fn ordinal_pattern() -> String {
    let mut words: Vec<&str> = ORDINAL_WORDS.iter().map(|(word, _)| *word).collect();
    words.sort_by_key(|word| std::cmp::Reverse(word.len()));
    format!("(?:{}|[0-9]{{1,2}}(?:st|nd|rd|th)?)", words.join("|"))
}

/// Matches a whole input that is nothing but an ordinal.
pub(crate) fn standalone_ordinal() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?i)^\s*({})\s*$", ordinal_pattern()))
            .expect("ordinal pattern is valid")
    })
}

/// Value of an ordinal word or number. Case-insensitive.
///
/// Returns `None` for text that is neither a known word nor digits with an
/// optional ordinal suffix. No range check is done here.
#[must_use]
pub fn parse_ordinal(text: &str) -> Option<u32> {
    let lower = text.trim().to_lowercase();
    if let Some((_, value)) = ORDINAL_WORDS.iter().find(|(word, _)| *word == lower) {
        return Some(*value);
    }

    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .unwrap_or(lower.as_str());
    digits.parse().ok()
}
