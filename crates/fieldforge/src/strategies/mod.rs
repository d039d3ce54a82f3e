//! The three cooperating extraction strategies (spec §4.4–§4.6), dispatched
//! through an enumerated variant rather than open polymorphism — the
//! arbiter must iterate the known set exhaustively, which a registry over a
//! closed enum models more directly than trait-object polymorphism over an
//! open set (spec §9).

pub mod crf_strategy;
pub mod diagnostics;
pub mod position_based;
pub mod rule_based;

use crate::crf::CrfModel;
use crate::types::{FieldConfig, FieldLocation, FieldValue, StrategyType, Word};
use crate::Result;

/// The page a strategy runs over.
pub struct PageContext<'a> {
    pub words: &'a [Word],
    pub page_width: f32,
    pub page_height: f32,
}

/// Common operation every strategy implements. Returns `Ok(None)` when the
/// strategy simply found nothing; `Err` is reserved for the rare case an
/// individual strategy can't even attempt extraction (spec §7's "strategy
/// exception" path) — the arbiter catches it, annotates that one strategy's
/// attempt, and continues with the rest.
pub trait Strategy {
    fn strategy_type(&self) -> StrategyType;
    fn extract(&self, page: &PageContext<'_>, field: &FieldConfig, location: &FieldLocation) -> Result<Option<FieldValue>>;
}

/// Builds the set of strategies the arbiter invokes for a template: rule-
/// based and position-based always, CRF only when a trained model is
/// available for it (spec §4.7's "Rule, Position, CRF-if-model-exists").
pub fn enabled_strategies(model: Option<&CrfModel>) -> Vec<Box<dyn Strategy + '_>> {
    let mut strategies: Vec<Box<dyn Strategy + '_>> =
        vec![Box::new(rule_based::RuleBasedStrategy), Box::new(position_based::PositionBasedStrategy)];
    if let Some(model) = model {
        strategies.push(Box::new(crf_strategy::CrfStrategy::new(model)));
    }
    strategies
}
