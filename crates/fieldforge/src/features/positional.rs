//! Per-page positional features (spec §4.2).

use super::{FeatureDict, FeatureValue};
use crate::types::Word;

/// Words within this many PDF units of `y0` are treated as on the same
/// line, matching the Template Analyzer's own line band.
const LINE_Y_BAND: f32 = 3.0;

pub fn extract_into(page_words: &[Word], idx: usize, page_width: f32, page_height: f32, dict: &mut FeatureDict) {
    let word = &page_words[idx];

    let x0_norm = if page_width > 0.0 { word.x0() / page_width } else { 0.0 };
    let y0_norm = if page_height > 0.0 { word.y0() / page_height } else { 0.0 };
    dict.insert("x0_norm".into(), FeatureValue::Num(x0_norm as f64));
    dict.insert("y0_norm".into(), FeatureValue::Num(y0_norm as f64));

    dict.insert("is_page_start".into(), FeatureValue::Bool(idx == 0));

    let same_line: Vec<&Word> = page_words.iter().filter(|w| (w.y0() - word.y0()).abs() <= LINE_Y_BAND).collect();

    let is_line_start = !same_line.iter().any(|w| w.x0() < word.x0());
    dict.insert("is_line_start".into(), FeatureValue::Bool(is_line_start));

    let is_line_end = !same_line.iter().any(|w| w.x0() > word.x0());
    dict.insert("is_line_end".into(), FeatureValue::Bool(is_line_end));

    let position_in_line = same_line.iter().filter(|w| w.x0() < word.x0()).count();
    dict.insert("position_in_line".into(), FeatureValue::Num(position_in_line as f64));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn w(x0: f32, y0: f32) -> Word {
        Word::new("x", 0, BoundingBox::new(x0, y0, x0 + 5.0, y0 + 10.0))
    }

    #[test]
    fn line_start_and_end_flags() {
        let words = vec![w(0.0, 100.0), w(20.0, 100.0), w(40.0, 100.0)];
        let mut d = FeatureDict::new();
        extract_into(&words, 0, 600.0, 800.0, &mut d);
        assert_eq!(d["is_line_start"].as_bool(), Some(true));
        assert_eq!(d["is_line_end"].as_bool(), Some(false));

        let mut d2 = FeatureDict::new();
        extract_into(&words, 2, 600.0, 800.0, &mut d2);
        assert_eq!(d2["is_line_start"].as_bool(), Some(false));
        assert_eq!(d2["is_line_end"].as_bool(), Some(true));
        assert_eq!(d2["position_in_line"].as_num(), Some(2.0));
    }
}
