//! The enumerated extraction strategies (spec §9's "dynamic dispatch via
//! enumerated variant" note, taken directly as the implementation).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    RuleBased,
    PositionBased,
    Crf,
}

impl StrategyType {
    pub const ALL: [StrategyType; 3] = [StrategyType::RuleBased, StrategyType::PositionBased, StrategyType::Crf];

    /// Normalizes legacy spellings seen in historical rows (spec §6):
    /// `rule-based`, `crf-model`, `rule-based-label` all collapse onto the
    /// three canonical values. Returns `None` for anything unrecognized.
    pub fn from_legacy_spelling(s: &str) -> Option<Self> {
        match s {
            "rule_based" | "rule-based" | "rule-based-label" => Some(Self::RuleBased),
            "position_based" | "position-based" => Some(Self::PositionBased),
            "crf" | "crf-model" => Some(Self::Crf),
            _ => None,
        }
    }

    pub fn canonical_str(&self) -> &'static str {
        match self {
            Self::RuleBased => "rule_based",
            Self::PositionBased => "position_based",
            Self::Crf => "crf",
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_str())
    }
}
