//! Mines a single `(original_value, corrected_value)` correction pair into
//! the structural deltas the catalogue tallies (spec §4.8): "for each
//! `(original_value, corrected_value)` pair, compare the two; if
//! `corrected ⊂ original` with a clean leading/trailing difference, record
//! the delta as prefix/suffix or structural wrapper; tally per pattern."

use super::catalogue::StructuralPattern;

/// What one correction taught the catalogue, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MinedDelta {
    pub structural: Vec<StructuralPattern>,
    pub prefix_tokens: Vec<String>,
    pub suffix_tokens: Vec<String>,
}

fn tokenize(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

/// Compares `original` and `corrected`. Returns `None` when `corrected` is
/// not a clean leading/trailing trim of `original` — e.g. the user
/// rewrote the value rather than trimming noise off it, which teaches the
/// catalogue nothing structural.
pub fn mine(original: &str, corrected: &str) -> Option<MinedDelta> {
    let trimmed_original = original.trim();
    let trimmed_corrected = corrected.trim();
    if trimmed_corrected.is_empty() || trimmed_corrected == trimmed_original {
        return None;
    }

    let pos = trimmed_original.find(trimmed_corrected)?;
    let prefix = trimmed_original[..pos].trim();
    let suffix = trimmed_original[pos + trimmed_corrected.len()..].trim();
    if prefix.is_empty() && suffix.is_empty() {
        return None;
    }

    Some(MinedDelta {
        structural: StructuralPattern::detect(trimmed_original),
        prefix_tokens: tokenize(prefix),
        suffix_tokens: tokenize(suffix),
    })
}
