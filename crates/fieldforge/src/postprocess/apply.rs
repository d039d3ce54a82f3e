//! Applies a [`PatternCatalogue`] to a value, in the fixed order spec §4.8
//! requires: wrapper brackets/quotes (both sides) → learned structural
//! start/end → learned prefix tokens → learned suffix tokens → trailing
//! punctuation → collapse whitespace. Every step is conditional on the
//! pattern's historical frequency for this field meeting `threshold`; none
//! is ever applied unconditionally.

use super::catalogue::{PatternCatalogue, StructuralPattern};

fn strip_wrapper_both(s: &str, open: char, close: char) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with(open) && trimmed.ends_with(close) {
        trimmed[open.len_utf8()..trimmed.len() - close.len_utf8()].trim().to_string()
    } else {
        s.to_string()
    }
}

fn strip_quotes_both(s: &str) -> String {
    let trimmed = s.trim();
    let mut chars = trimmed.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return s.to_string();
    };
    let is_quote = |c: char| c == '"' || c == '\'';
    if trimmed.len() >= 2 && is_quote(first) && is_quote(last) {
        trimmed[first.len_utf8()..trimmed.len() - last.len_utf8()].trim().to_string()
    } else {
        s.to_string()
    }
}

fn strip_leading_char(s: &str, c: char) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with(c) {
        trimmed[c.len_utf8()..].trim().to_string()
    } else {
        s.to_string()
    }
}

fn strip_trailing_char(s: &str, c: char) -> String {
    let trimmed = s.trim();
    if trimmed.ends_with(c) {
        trimmed[..trimmed.len() - c.len_utf8()].trim().to_string()
    } else {
        s.to_string()
    }
}

fn strip_leading_token(s: &str, token: &str) -> String {
    let trimmed = s.trim();
    if let Some(rest) = trimmed.strip_prefix(token) {
        rest.trim().to_string()
    } else {
        s.to_string()
    }
}

fn strip_trailing_token(s: &str, token: &str) -> String {
    let trimmed = s.trim();
    if let Some(rest) = trimmed.strip_suffix(token) {
        rest.trim().to_string()
    } else {
        s.to_string()
    }
}

/// Cleans `value` using whatever `catalogue` has learned for this field,
/// conditional on `threshold` (spec default `0.10`).
pub fn apply(catalogue: &PatternCatalogue, value: &str, threshold: f64) -> String {
    let mut s = value.to_string();

    if catalogue.structural_frequency(StructuralPattern::ParenthesesBoth) >= threshold {
        s = strip_wrapper_both(&s, '(', ')');
    }
    if catalogue.structural_frequency(StructuralPattern::QuotesBoth) >= threshold {
        s = strip_quotes_both(&s);
    }

    if catalogue.structural_frequency(StructuralPattern::ParenthesesStart) >= threshold {
        s = strip_leading_char(&s, '(');
    }
    if catalogue.structural_frequency(StructuralPattern::ParenthesesEnd) >= threshold {
        s = strip_trailing_char(&s, ')');
    }

    for token in catalogue.frequent_prefixes(threshold) {
        s = strip_leading_token(&s, &token);
    }
    for token in catalogue.frequent_suffixes(threshold) {
        s = strip_trailing_token(&s, &token);
    }

    if catalogue.structural_frequency(StructuralPattern::TrailingComma) >= threshold {
        s = strip_trailing_char(&s, ',');
    }
    if catalogue.structural_frequency(StructuralPattern::TrailingPeriod) >= threshold {
        s = strip_trailing_char(&s, '.');
    }

    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::mining::mine;

    fn catalogue_from(pairs: &[(&str, &str)]) -> PatternCatalogue {
        let mut catalogue = PatternCatalogue::new();
        for (original, corrected) in pairs {
            catalogue.record(mine(original, corrected).as_ref());
        }
        catalogue
    }

    #[test]
    fn strips_learned_prefix_once_frequent_enough() {
        let catalogue = catalogue_from(&[
            ("Mr. John Smith", "John Smith"),
            ("Mr. Jane Doe", "Jane Doe"),
            ("Bob Jones", "Bob Jones"),
        ]);
        assert_eq!(apply(&catalogue, "Mr. Alice Wu", 0.10), "Alice Wu");
    }

    #[test]
    fn below_threshold_pattern_is_never_applied() {
        let mut catalogue = catalogue_from(&[("Mr. John Smith", "John Smith")]);
        // Pad the denominator so the prefix's frequency falls under 10%.
        for _ in 0..20 {
            catalogue.record(None);
        }
        assert_eq!(apply(&catalogue, "Mr. Alice Wu", 0.10), "Mr. Alice Wu");
    }

    #[test]
    fn strips_both_sided_parentheses_when_learned() {
        let catalogue = catalogue_from(&[("(Jakarta)", "Jakarta"), ("(Bandung)", "Bandung")]);
        assert_eq!(apply(&catalogue, "(Surabaya)", 0.10), "Surabaya");
    }

    #[test]
    fn collapses_whitespace_unconditionally() {
        let catalogue = PatternCatalogue::new();
        assert_eq!(apply(&catalogue, "  John   Smith  ", 0.10), "John Smith");
    }
}
