//! Overall score aggregation.

use crate::config::DEFAULT_CORROBORATION_BONUS;
use crate::types::{Signal, MAX_CONFIDENCE};
use crate::utils::numeric::round1;

/// Score with the default corroboration bonus.
pub fn aggregate(signals: &[Signal]) -> f64 {
    aggregate_with_bonus(signals, DEFAULT_CORROBORATION_BONUS)
}

/// Mean confidence, plus `bonus` when more than one rule fired, capped at 10
/// and rounded to one decimal. No signals scores 0.
pub fn aggregate_with_bonus(signals: &[Signal], bonus: f64) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    let mean = signals.iter().map(|s| s.confidence).sum::<f64>() / signals.len() as f64;
    let bonus = if signals.len() > 1 {
        bonus.clamp(0.0, MAX_CONFIDENCE)
    } else {
        0.0
    };
    round1((mean + bonus).clamp(0.0, MAX_CONFIDENCE))
}
