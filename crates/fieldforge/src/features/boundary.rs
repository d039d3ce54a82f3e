//! Boundary / structural features (spec §4.2).

use super::{FeatureDict, FeatureValue};
use crate::types::Word;

/// A y-jump larger than this from the previous word is treated as a line
/// break ("newline"), per spec.
const NEWLINE_Y_JUMP: f32 = 10.0;

pub fn extract_into(page_words: &[Word], idx: usize, dict: &mut FeatureDict) {
    let word = &page_words[idx];

    let prev = idx.checked_sub(1).and_then(|i| page_words.get(i));

    let is_after_punctuation = prev.is_some_and(|p| p.text.chars().last().is_some_and(|c| c.is_ascii_punctuation()));
    dict.insert("is_after_punctuation".into(), FeatureValue::Bool(is_after_punctuation));

    let next = page_words.get(idx + 1);
    let is_before_punctuation = next.is_some_and(|n| n.text.chars().next().is_some_and(|c| c.is_ascii_punctuation()));
    dict.insert("is_before_punctuation".into(), FeatureValue::Bool(is_before_punctuation));

    let is_after_newline = prev.is_some_and(|p| (word.y0() - p.y0()).abs() > NEWLINE_Y_JUMP);
    dict.insert("is_after_newline".into(), FeatureValue::Bool(is_after_newline));

    let follows_capitalized = prev.is_some_and(|p| super::lexical::is_title_case(&p.text));
    dict.insert("follows_capitalized".into(), FeatureValue::Bool(follows_capitalized));
}
