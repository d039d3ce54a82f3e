//! Shared "no value found" diagnostic logging (spec §4.6, §9), reused by
//! all three strategies so every `Ok(None)` leaves a structured breadcrumb
//! rather than only the CRF path explaining itself.

use crate::types::StrategyType;

/// Logs why a strategy returned `Ok(None)` for a field. `reason` is a short
/// human-readable cause; `detail` carries strategy-specific structured
/// context (kind counts, candidate-text length, window word count) already
/// formatted by the caller, since each strategy's useful detail differs.
pub fn log_no_value(strategy: StrategyType, field_name: &str, reason: &str, detail: &str) {
    tracing::debug!(strategy = %strategy, field = %field_name, reason, detail, "strategy found no value for field");
}
