//! Strict BIO labeling from a `(field_name, value)` ground-truth pair
//! (spec §4.3).
//!
//! The window is always exactly `len(corrected_tokens)` wide; there is no
//! window expansion and no substring containment. Those two shortcuts are
//! what produced the "dalam kegiatan X" leakage bug the spec calls out, and
//! are forbidden here. If no exact window matches, the pair is skipped —
//! mislabeling is worse than a missing sample.

use crate::types::{BioLabel, Word};

fn normalize_token(s: &str) -> String {
    s.chars().filter(|c| !c.is_ascii_punctuation()).collect::<String>().to_lowercase()
}

fn tokenize_value(value: &str) -> Vec<String> {
    value.split_whitespace().map(normalize_token).filter(|t| !t.is_empty()).collect()
}

/// Labels `words` (one page's word list) with BIO tags for `field_name`
/// wherever `value`'s tokens match exactly, word-for-word, after
/// punctuation-stripping and lowercasing. Returns `None` if no window
/// matches.
pub fn label_sequence(words: &[Word], field_name: &str, value: &str) -> Option<Vec<BioLabel>> {
    let corrected_tokens = tokenize_value(value);
    if corrected_tokens.is_empty() || words.len() < corrected_tokens.len() {
        return None;
    }

    let window_len = corrected_tokens.len();
    let start = (0..=words.len() - window_len).find(|&start| {
        words[start..start + window_len]
            .iter()
            .map(|w| normalize_token(&w.text))
            .eq(corrected_tokens.iter().cloned())
    })?;

    let mut labels = vec![BioLabel::O; words.len()];
    labels[start] = BioLabel::B(field_name.to_string());
    for label in labels.iter_mut().take(start + window_len).skip(start + 1) {
        *label = BioLabel::I(field_name.to_string());
    }
    Some(labels)
}
