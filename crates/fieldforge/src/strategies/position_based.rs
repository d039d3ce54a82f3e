//! Position-Based Strategy (spec §4.5): purely geometric — the marker's
//! spatial window bounded above by the marker itself and below by the next
//! field, no regex involved.

use super::diagnostics::log_no_value;
use super::{PageContext, Strategy};
use crate::types::{FieldConfig, FieldLocation, FieldValue, StrategyType};
use crate::Result;

pub struct PositionBasedStrategy;

impl Strategy for PositionBasedStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::PositionBased
    }

    fn extract(&self, page: &PageContext<'_>, field: &FieldConfig, location: &FieldLocation) -> Result<Option<FieldValue>> {
        let marker = &location.marker_bbox;
        let label = &location.context.label_position;
        let next_field_y = location.context.next_field_y;

        let mut words: Vec<(f32, f32, &str)> = page
            .words
            .iter()
            .filter(|w| w.page_index == location.page)
            .filter(|w| w.y0() >= marker.y0)
            .filter(|w| next_field_y.is_none_or(|y| w.y0() < y))
            .filter(|w| w.x0() >= label.x0 - 10.0)
            .map(|w| (w.y0(), w.x0(), w.text.as_str()))
            .collect();

        if words.is_empty() {
            log_no_value(StrategyType::PositionBased, &field.field_name, "no words inside the marker's spatial window", "");
            return Ok(None);
        }

        words.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.partial_cmp(&b.1).unwrap()));
        let value = words.into_iter().map(|(_, _, text)| text).collect::<Vec<_>>().join(" ");

        Ok(Some(FieldValue::new(value, 0.9, StrategyType::PositionBased)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, FieldContext, Word};

    #[test]
    fn concatenates_words_in_the_window_ordered_by_position() {
        let words = vec![
            Word::new("Date:", 0, BoundingBox::new(0.0, 100.0, 30.0, 110.0)),
            Word::new("31", 0, BoundingBox::new(35.0, 130.0, 45.0, 140.0)),
            Word::new("May", 0, BoundingBox::new(48.0, 130.0, 70.0, 140.0)),
            Word::new("Name:", 0, BoundingBox::new(0.0, 150.0, 30.0, 160.0)),
        ];
        let page = PageContext { words: &words, page_width: 600.0, page_height: 800.0 };
        let field = FieldConfig { field_name: "date".into(), ..Default::default() };
        let location = FieldLocation {
            page: 0,
            marker_bbox: BoundingBox::new(35.0, 130.0, 45.0, 140.0),
            context: FieldContext {
                label: "Date:".into(),
                label_position: BoundingBox::new(0.0, 100.0, 30.0, 110.0),
                words_before: vec![],
                words_after: vec![],
                next_field_y: Some(150.0),
                typical_length: None,
            },
        };

        let result = PositionBasedStrategy.extract(&page, &field, &location).unwrap().unwrap();
        assert_eq!(result.value, "31 May");
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn empty_window_returns_none() {
        let words = vec![Word::new("Date:", 0, BoundingBox::new(0.0, 100.0, 30.0, 110.0))];
        let page = PageContext { words: &words, page_width: 600.0, page_height: 800.0 };
        let field = FieldConfig { field_name: "date".into(), ..Default::default() };
        let location = FieldLocation {
            page: 0,
            marker_bbox: BoundingBox::new(35.0, 100.0, 45.0, 110.0),
            context: FieldContext {
                label: "Date:".into(),
                label_position: BoundingBox::new(0.0, 100.0, 30.0, 110.0),
                words_before: vec![],
                words_after: vec![],
                next_field_y: None,
                typical_length: None,
            },
        };

        assert!(PositionBasedStrategy.extract(&page, &field, &location).unwrap().is_none());
    }
}
