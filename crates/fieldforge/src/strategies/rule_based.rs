//! Rule-Based Strategy (spec §4.4): regex over label-proximate text, with
//! an adaptive default pattern policy and a hard stop at the next field.

use super::diagnostics::log_no_value;
use super::{PageContext, Strategy};
use crate::types::{FieldConfig, FieldLocation, FieldValue, StrategyType};
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback used when a field has neither a learned nor a configured
/// pattern: matches up to 200 characters non-greedily, stopping at a
/// newline, end of input, or sentence-ish punctuation. The greedy `.+` is
/// forbidden — it would dominate every learned pattern (spec §9).
const FALLBACK_PATTERN: &str = r".{1,200}?(?=\n|$|[.,:;])";
const SAME_LINE_Y_TOLERANCE: f32 = 3.0;

static FALLBACK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(FALLBACK_PATTERN).unwrap());

pub struct RuleBasedStrategy;

impl RuleBasedStrategy {
    /// Words to the right of the label on its line, plus wrapped
    /// continuation lines, stopping at the first word at or past
    /// `next_field_y`. Joined with `\n` between lines so the fallback
    /// pattern's `(?=\n|$|...)` lookahead has something to anchor on.
    fn candidate_text(&self, page: &PageContext<'_>, location: &FieldLocation) -> String {
        let label = &location.context.label_position;
        let next_field_y = location.context.next_field_y;

        let mut lines: Vec<(f32, Vec<(f32, &str)>)> = Vec::new();
        for word in page.words {
            if word.page_index != location.page {
                continue;
            }
            if let Some(y) = next_field_y {
                if word.y0() >= y {
                    continue;
                }
            }
            let same_line_as_label = (word.y0() - label.y0).abs() <= SAME_LINE_Y_TOLERANCE;
            let on_label_line_after = same_line_as_label && word.x0() >= label.x1;
            let wrapped_continuation = word.y0() > label.y0 + SAME_LINE_Y_TOLERANCE;
            if !on_label_line_after && !wrapped_continuation {
                continue;
            }

            match lines.iter_mut().find(|(y, _)| (*y - word.y0()).abs() <= SAME_LINE_Y_TOLERANCE) {
                Some((_, words)) => words.push((word.x0(), word.text.as_str())),
                None => lines.push((word.y0(), vec![(word.x0(), word.text.as_str())])),
            }
        }

        lines.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        lines
            .into_iter()
            .map(|(_, mut words)| {
                words.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
                words.into_iter().map(|(_, t)| t).collect::<Vec<_>>().join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Crude specificity proxy: the denser a pattern is in literal
    /// alphanumerics (vs. regex metacharacters), the more specific it is.
    /// Scaled so `0.6 + 0.1 * specificity` lands in `[0.6, 1.0]`.
    fn pattern_specificity(pattern: &str) -> f64 {
        let literal_chars = pattern.chars().filter(|c| c.is_alphanumeric()).count();
        (literal_chars as f64 / pattern.len().max(1) as f64 * 4.0).min(4.0)
    }

    fn try_pattern(&self, pattern: &str, text: &str) -> Option<(String, f64)> {
        let regex = Regex::new(pattern).ok()?;
        let matched = regex.find(text)?;
        let value = matched.as_str().trim().to_string();
        if value.is_empty() {
            return None;
        }
        let confidence = (0.6 + 0.1 * Self::pattern_specificity(pattern)).min(1.0);
        Some((value, confidence))
    }
}

impl Strategy for RuleBasedStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::RuleBased
    }

    fn extract(&self, page: &PageContext<'_>, field: &FieldConfig, location: &FieldLocation) -> Result<Option<FieldValue>> {
        let text = self.candidate_text(page, location);
        if text.trim().is_empty() {
            log_no_value(StrategyType::RuleBased, &field.field_name, "no candidate text in the label's window", "");
            return Ok(None);
        }

        let mut best_learned = 0.0_f64;
        for pattern in &field.learned_patterns {
            if let Some((value, confidence)) = self.try_pattern(pattern, &text) {
                best_learned = best_learned.max(confidence);
                if confidence >= 0.7 {
                    return Ok(Some(FieldValue::new(value, confidence, StrategyType::RuleBased)));
                }
            }
        }

        let fallback_result = match field.effective_pattern() {
            Some(pattern) => self.try_pattern(pattern, &text),
            None => FALLBACK_REGEX.find(&text).and_then(|m| {
                let value = m.as_str().trim().to_string();
                if value.is_empty() {
                    None
                } else {
                    Some((value, 0.6))
                }
            }),
        };

        let Some((value, confidence)) = fallback_result else {
            log_no_value(
                StrategyType::RuleBased,
                &field.field_name,
                "no pattern matched the candidate text",
                &format!("candidate_len={} learned_patterns={}", text.len(), field.learned_patterns.len()),
            );
            return Ok(None);
        };
        if best_learned < 0.3 && confidence < 0.5 {
            log_no_value(
                StrategyType::RuleBased,
                &field.field_name,
                "match confidence too low to accept",
                &format!("best_learned={best_learned:.2} fallback_confidence={confidence:.2}"),
            );
            return Ok(None);
        }

        Ok(Some(FieldValue::new(value, confidence, StrategyType::RuleBased)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, FieldContext, Word};

    fn w(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Word {
        Word::new(text, 0, BoundingBox::new(x0, y0, x1, y1))
    }

    fn location_with(label: &str, label_bbox: BoundingBox, next_field_y: Option<f32>) -> FieldLocation {
        FieldLocation {
            page: 0,
            marker_bbox: label_bbox,
            context: FieldContext {
                label: label.to_string(),
                label_position: label_bbox,
                words_before: vec![],
                words_after: vec![],
                next_field_y,
                typical_length: None,
            },
        }
    }

    #[test]
    fn fallback_pattern_stops_at_next_field() {
        let words = vec![
            w("Date:", 0.0, 100.0, 30.0, 110.0),
            w("31", 35.0, 100.0, 45.0, 110.0),
            w("May", 48.0, 100.0, 70.0, 110.0),
            w("2025", 73.0, 100.0, 100.0, 110.0),
            w("Name:", 0.0, 150.0, 30.0, 160.0),
        ];
        let page = PageContext { words: &words, page_width: 600.0, page_height: 800.0 };
        let field = FieldConfig { field_name: "date".into(), ..Default::default() };
        let location = location_with("Date:", BoundingBox::new(0.0, 100.0, 30.0, 110.0), Some(150.0));

        let result = RuleBasedStrategy.extract(&page, &field, &location).unwrap().unwrap();
        assert!(result.value.contains("31"));
        assert!(!result.value.contains("Name"));
    }

    #[test]
    fn no_candidate_text_returns_none() {
        let words = vec![w("Date:", 0.0, 100.0, 30.0, 110.0)];
        let page = PageContext { words: &words, page_width: 600.0, page_height: 800.0 };
        let field = FieldConfig { field_name: "date".into(), ..Default::default() };
        let location = location_with("Date:", BoundingBox::new(0.0, 100.0, 30.0, 110.0), None);

        assert!(RuleBasedStrategy.extract(&page, &field, &location).unwrap().is_none());
    }
}
