//! BIO tagging for CRF training sequences (spec §3).
//!
//! `I-F` may never appear unless the immediately preceding label is `B-F`
//! or `I-F` for the same field; that invariant is enforced at label
//! generation time (see `crf::labeling`), not by the model itself.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BioLabel {
    O,
    B(String),
    I(String),
}

impl BioLabel {
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::O => None,
            Self::B(f) | Self::I(f) => Some(f.as_str()),
        }
    }

    pub fn is_begin_of(&self, field: &str) -> bool {
        matches!(self, Self::B(f) if f == field)
    }

    pub fn is_inside_of(&self, field: &str) -> bool {
        matches!(self, Self::I(f) if f == field)
    }

    /// Parses the `"O" | "B-{FIELD}" | "I-{FIELD}"` textual form.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Self::O);
        }
        let (prefix, field) = s.split_once('-')?;
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
            return None;
        }
        match prefix {
            "B" => Some(Self::B(field.to_string())),
            "I" => Some(Self::I(field.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for BioLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::O => write!(f, "O"),
            Self::B(field) => write!(f, "B-{field}"),
            Self::I(field) => write!(f, "I-{field}"),
        }
    }
}

/// Checks the strict-BIO invariant over a whole sequence: every `I-F` is
/// immediately preceded by `B-F` or `I-F`.
pub fn is_valid_bio_sequence(labels: &[BioLabel]) -> bool {
    for (idx, label) in labels.iter().enumerate() {
        if let BioLabel::I(field) = label {
            let valid_predecessor = idx > 0
                && match &labels[idx - 1] {
                    BioLabel::B(prev) | BioLabel::I(prev) => prev == field,
                    BioLabel::O => false,
                };
            if !valid_predecessor {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trip() {
        assert_eq!(BioLabel::parse("O"), Some(BioLabel::O));
        assert_eq!(BioLabel::parse("B-EVENT_NAME"), Some(BioLabel::B("EVENT_NAME".into())));
        assert_eq!(BioLabel::parse("I-EVENT_NAME"), Some(BioLabel::I("EVENT_NAME".into())));
        assert_eq!(BioLabel::parse("garbage"), None);
        assert_eq!(BioLabel::parse("B-lower"), None);
    }

    #[test]
    fn rejects_orphan_inside_tag() {
        let labels = vec![BioLabel::O, BioLabel::I("EVENT_NAME".into())];
        assert!(!is_valid_bio_sequence(&labels));
    }

    #[test]
    fn accepts_well_formed_span() {
        let labels = vec![
            BioLabel::O,
            BioLabel::B("EVENT_NAME".into()),
            BioLabel::I("EVENT_NAME".into()),
            BioLabel::I("EVENT_NAME".into()),
            BioLabel::O,
        ];
        assert!(is_valid_bio_sequence(&labels));
    }

    #[test]
    fn rejects_inside_tag_after_different_field() {
        let labels = vec![BioLabel::B("A".into()), BioLabel::I("B".into())];
        assert!(!is_valid_bio_sequence(&labels));
    }
}
