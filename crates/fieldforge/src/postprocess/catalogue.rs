//! Per-`(template, field)` learned pattern catalogue (spec §4.8): structural
//! wrapper patterns plus frequent prefix/suffix tokens, each tallied against
//! the number of corrections seen so cleaning stays conditional on
//! historical frequency and never hardcodes a specific string.

use super::mining::MinedDelta;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralPattern {
    ParenthesesBoth,
    ParenthesesStart,
    ParenthesesEnd,
    QuotesBoth,
    TrailingComma,
    TrailingPeriod,
}

impl StructuralPattern {
    /// Detects which structural wrapper patterns `original` (the
    /// pre-correction value) exhibits. Several may fire at once (a value
    /// can be both quoted and end in a comma).
    pub fn detect(original: &str) -> Vec<Self> {
        let mut hits = Vec::new();
        let starts_paren = original.starts_with('(');
        let ends_paren = original.ends_with(')');
        if starts_paren && ends_paren {
            hits.push(Self::ParenthesesBoth);
        } else if starts_paren {
            hits.push(Self::ParenthesesStart);
        } else if ends_paren {
            hits.push(Self::ParenthesesEnd);
        }

        let starts_quote = original.starts_with('"') || original.starts_with('\'');
        let ends_quote = original.ends_with('"') || original.ends_with('\'');
        if starts_quote && ends_quote {
            hits.push(Self::QuotesBoth);
        }

        if original.ends_with(',') {
            hits.push(Self::TrailingComma);
        }
        if original.ends_with('.') {
            hits.push(Self::TrailingPeriod);
        }

        hits
    }
}

/// Mined, tallied history for one `(template_id, field_name)` pair.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalogue {
    total_corrections: usize,
    structural_counts: HashMap<StructuralPattern, usize>,
    prefix_counts: HashMap<String, usize>,
    suffix_counts: HashMap<String, usize>,
}

impl PatternCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one correction's mined delta. `was_correction` counts even
    /// when `mine()` found nothing structural — the denominator is "total
    /// corrections for this field", not "corrections that taught us
    /// something" (spec §4.8's "≥ 10% of corrections").
    pub fn record(&mut self, delta: Option<&MinedDelta>) {
        self.total_corrections += 1;
        let Some(delta) = delta else { return };
        for pattern in &delta.structural {
            *self.structural_counts.entry(*pattern).or_insert(0) += 1;
        }
        for token in &delta.prefix_tokens {
            *self.prefix_counts.entry(token.clone()).or_insert(0) += 1;
        }
        for token in &delta.suffix_tokens {
            *self.suffix_counts.entry(token.clone()).or_insert(0) += 1;
        }
    }

    fn frequency(&self, count: usize) -> f64 {
        if self.total_corrections == 0 {
            0.0
        } else {
            count as f64 / self.total_corrections as f64
        }
    }

    pub fn structural_frequency(&self, pattern: StructuralPattern) -> f64 {
        self.frequency(*self.structural_counts.get(&pattern).unwrap_or(&0))
    }

    /// Prefix tokens stripped away by at least `threshold` of corrections
    /// for this field, most frequent first.
    pub fn frequent_prefixes(&self, threshold: f64) -> Vec<String> {
        self.frequent_tokens(&self.prefix_counts, threshold)
    }

    pub fn frequent_suffixes(&self, threshold: f64) -> Vec<String> {
        self.frequent_tokens(&self.suffix_counts, threshold)
    }

    fn frequent_tokens(&self, counts: &HashMap<String, usize>, threshold: f64) -> Vec<String> {
        let mut tokens: Vec<(String, usize)> = counts
            .iter()
            .filter(|(_, &count)| self.frequency(count) >= threshold)
            .map(|(token, &count)| (token.clone(), count))
            .collect();
        tokens.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tokens.into_iter().map(|(token, _)| token).collect()
    }
}
