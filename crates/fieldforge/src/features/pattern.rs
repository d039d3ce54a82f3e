//! Structural pattern features (spec §4.2) — shape-based, never
//! keyword-based.

use super::{FeatureDict, FeatureValue};
use crate::types::Word;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}$").unwrap());

fn is_year(text: &str) -> bool {
    text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) && text.parse::<u32>().is_ok_and(|y| (1900..=2100).contains(&y))
}

fn is_day_number(text: &str) -> bool {
    (1..=2).contains(&text.len())
        && text.chars().all(|c| c.is_ascii_digit())
        && text.parse::<u32>().is_ok_and(|d| (1..=31).contains(&d))
}

fn is_capitalized_word(text: &str) -> bool {
    super::lexical::is_title_case(text) && text.chars().all(|c| c.is_alphabetic()) && text.chars().count() > 2
}

fn is_date_separator(text: &str) -> bool {
    matches!(text, "," | "-" | "/" | ".")
}

pub fn extract_into(page_words: &[Word], idx: usize, dict: &mut FeatureDict) {
    let word = &page_words[idx];
    let text = &word.text;

    dict.insert("is_year".into(), FeatureValue::Bool(is_year(text)));
    dict.insert("is_day_number".into(), FeatureValue::Bool(is_day_number(text)));
    dict.insert("is_capitalized_word".into(), FeatureValue::Bool(is_capitalized_word(text)));
    dict.insert("is_date_separator".into(), FeatureValue::Bool(is_date_separator(text)));
    dict.insert("looks_like_date_pattern".into(), FeatureValue::Bool(DATE_PATTERN.is_match(text)));

    let prev = idx.checked_sub(1).and_then(|i| page_words.get(i));
    let next = page_words.get(idx + 1);
    let neighbor_numeric_context = |w: &Word| w.text.chars().next().is_some_and(|c| c.is_ascii_digit()) || is_capitalized_word(&w.text);
    let has_numeric_context = prev.is_some_and(neighbor_numeric_context) || next.is_some_and(neighbor_numeric_context);
    dict.insert("has_numeric_context".into(), FeatureValue::Bool(has_numeric_context));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_and_day_detection() {
        assert!(is_year("2025"));
        assert!(!is_year("1899"));
        assert!(is_day_number("31"));
        assert!(!is_day_number("32"));
    }

    #[test]
    fn date_pattern_regex() {
        assert!(DATE_PATTERN.is_match("31-05-2025"));
        assert!(DATE_PATTERN.is_match("5/6/25"));
        assert!(!DATE_PATTERN.is_match("hello"));
    }
}
