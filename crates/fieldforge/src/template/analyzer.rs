//! Builds a [`TemplateConfig`] from a sample PDF whose markers are literal
//! `{field_name}` placeholders in the document text (spec §4.1).

use crate::types::{BoundingBox, FieldConfig, FieldContext, FieldLocation, TemplateConfig, Word};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Words within this many PDF units of each other's `y0` are considered to
/// be on the same line (matches the ±3 band used for `is_line_start` in the
/// feature extractor, spec §4.2).
const SAME_LINE_Y_TOLERANCE: f32 = 3.0;
const CONTEXT_WORD_COUNT: usize = 5;

static MARKER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{([A-Za-z][A-Za-z0-9_]*)\}$").unwrap());

#[derive(Debug, Clone)]
struct DetectedMarker {
    field_name: String,
    page: usize,
    marker_bbox: BoundingBox,
    label: String,
    label_position: BoundingBox,
    words_before: Vec<String>,
    words_after: Vec<String>,
}

#[derive(Default)]
pub struct TemplateAnalyzer;

impl TemplateAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyzes a tokenized sample document and produces a [`TemplateConfig`].
    pub fn analyze(&self, words: &[Word]) -> TemplateConfig {
        let mut markers: Vec<DetectedMarker> = Vec::new();

        let mut by_page: HashMap<usize, Vec<&Word>> = HashMap::new();
        for w in words {
            by_page.entry(w.page_index).or_default().push(w);
        }

        for (&page, page_words) in &by_page {
            for (idx, word) in page_words.iter().enumerate() {
                let Some(caps) = MARKER_PATTERN.captures(&word.text) else { continue };
                let field_name = caps[1].to_string();

                let same_line: Vec<(usize, &&Word)> = page_words
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| (w.y0() - word.y0()).abs() <= SAME_LINE_Y_TOLERANCE)
                    .collect();

                // Nearest word to the left on the same line becomes the label.
                let label_word = same_line
                    .iter()
                    .filter(|(_, w)| w.x1() <= word.x0())
                    .max_by(|(_, a), (_, b)| a.x1().partial_cmp(&b.x1()).unwrap());

                let (label, label_position) = match label_word {
                    Some((_, w)) => (w.text.clone(), w.bbox),
                    None => (String::new(), word.bbox),
                };

                let mut before: Vec<(f32, String)> = same_line
                    .iter()
                    .filter(|(i, _)| *i != idx)
                    .filter(|(_, w)| w.x1() <= word.x0())
                    .map(|(_, w)| (w.x0(), w.text.clone()))
                    .collect();
                before.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
                let words_before: Vec<String> = before
                    .into_iter()
                    .rev()
                    .take(CONTEXT_WORD_COUNT)
                    .rev()
                    .map(|(_, t)| t)
                    .collect();

                let mut after: Vec<(f32, String)> = same_line
                    .iter()
                    .filter(|(_, w)| w.x0() >= word.x1())
                    .map(|(_, w)| (w.x0(), w.text.clone()))
                    .collect();
                after.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
                let words_after: Vec<String> = after.into_iter().take(CONTEXT_WORD_COUNT).map(|(_, t)| t).collect();

                markers.push(DetectedMarker {
                    field_name,
                    page,
                    marker_bbox: word.bbox,
                    label,
                    label_position,
                    words_before,
                    words_after,
                });
            }
        }

        // Sort by page then y0 ascending so the "next field" is well defined
        // (spec §4.1); overlapping markers remain distinct entries and are
        // simply adjacent in the sort.
        markers.sort_by(|a, b| (a.page, a.marker_bbox.y0).partial_cmp(&(b.page, b.marker_bbox.y0)).unwrap());

        let mut fields = HashMap::new();
        for (i, marker) in markers.iter().enumerate() {
            let next_field_y = markers[i + 1..]
                .iter()
                .find(|m| m.page == marker.page)
                .map(|m| m.marker_bbox.y0);

            let typical_length = Some(marker.marker_bbox.width());

            let context = FieldContext {
                label: marker.label.clone(),
                label_position: marker.label_position,
                words_before: marker.words_before.clone(),
                words_after: marker.words_after.clone(),
                next_field_y,
                typical_length,
            };

            let location = FieldLocation { page: marker.page, marker_bbox: marker.marker_bbox, context };

            fields
                .entry(marker.field_name.clone())
                .or_insert_with(|| FieldConfig {
                    field_name: marker.field_name.clone(),
                    ..Default::default()
                })
                .locations
                .push(location);
        }

        TemplateConfig { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn w(text: &str, page: usize, x0: f32, y0: f32, x1: f32, y1: f32) -> Word {
        Word::new(text, page, BoundingBox::new(x0, y0, x1, y1))
    }

    #[test]
    fn detects_marker_label_and_next_field_y() {
        let words = vec![
            w("Date:", 0, 0.0, 100.0, 30.0, 110.0),
            w("{date}", 0, 35.0, 100.0, 70.0, 110.0),
            w("Name:", 0, 0.0, 150.0, 30.0, 160.0),
            w("{name}", 0, 35.0, 150.0, 70.0, 160.0),
        ];

        let template = TemplateAnalyzer::new().analyze(&words);
        assert_eq!(template.fields.len(), 2);

        let date_field = template.field("date").unwrap();
        let loc = &date_field.locations[0];
        assert_eq!(loc.context.label, "Date:");
        assert_eq!(loc.context.next_field_y, Some(150.0));

        let name_field = template.field("name").unwrap();
        assert_eq!(name_field.locations[0].context.next_field_y, None);
    }

    #[test]
    fn marker_without_label_has_empty_label_and_unaffected_next_field_y() {
        let words = vec![
            w("{orphan}", 0, 35.0, 100.0, 70.0, 110.0),
            w("Name:", 0, 0.0, 150.0, 30.0, 160.0),
            w("{name}", 0, 35.0, 150.0, 70.0, 160.0),
        ];

        let template = TemplateAnalyzer::new().analyze(&words);
        let orphan = template.field("orphan").unwrap();
        assert_eq!(orphan.locations[0].context.label, "");
        assert_eq!(orphan.locations[0].context.next_field_y, Some(150.0));
    }
}
