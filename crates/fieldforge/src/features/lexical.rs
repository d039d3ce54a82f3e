//! Lexical / orthographic features (spec §4.2).

use super::{FeatureDict, FeatureValue};
use crate::types::Word;

fn length_bucket(len: usize) -> &'static str {
    match len {
        0..=2 => "short",
        3..=6 => "medium",
        7..=12 => "long",
        _ => "very_long",
    }
}

pub fn extract_into(word: &Word, dict: &mut FeatureDict) {
    let text = &word.text;
    let lower = text.to_lowercase();

    dict.insert("word_lower".into(), FeatureValue::Str(lower.clone()));
    dict.insert("word_is_title".into(), FeatureValue::Bool(is_title_case(text)));
    dict.insert("word_is_upper".into(), FeatureValue::Bool(!text.is_empty() && text.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())));
    dict.insert("word_is_digit".into(), FeatureValue::Bool(!text.is_empty() && text.chars().all(|c| c.is_ascii_digit())));
    dict.insert("word_is_alpha".into(), FeatureValue::Bool(!text.is_empty() && text.chars().all(|c| c.is_alphabetic())));

    for n in 1..=3 {
        let prefix: String = lower.chars().take(n).collect();
        let suffix: String = lower.chars().rev().take(n).collect::<String>().chars().rev().collect();
        dict.insert(format!("prefix_{n}"), FeatureValue::Str(prefix));
        dict.insert(format!("suffix_{n}"), FeatureValue::Str(suffix));
    }

    dict.insert("length_bucket".into(), FeatureValue::Str(length_bucket(text.chars().count()).to_string()));
    dict.insert("has_digit".into(), FeatureValue::Bool(text.chars().any(|c| c.is_ascii_digit())));
    dict.insert("has_punct".into(), FeatureValue::Bool(text.chars().any(|c| c.is_ascii_punctuation())));
}

/// `istitle()`-equivalent: first alphabetic char uppercase, the rest (if
/// alphabetic) lowercase — matches Python's `str.istitle` for single words.
pub fn is_title_case(text: &str) -> bool {
    let mut chars = text.chars().filter(|c| c.is_alphabetic());
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| c.is_lowercase()),
        _ => false,
    }
}
