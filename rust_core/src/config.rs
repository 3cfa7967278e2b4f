//! Engine tuning knobs.

use crate::types::MAX_CONFIDENCE;
use tracing::warn;

pub const DEFAULT_HIGH_CONFIDENCE_THRESHOLD: f64 = 6.5;
pub const DEFAULT_MIN_HIGH_CONFIDENCE_SIGNALS: usize = 1;
pub const DEFAULT_CORROBORATION_BONUS: f64 = 1.0;

/// Scoring and recommendation configuration
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Signals at or above this confidence count toward the recommendation
    pub high_confidence_threshold: f64,
    /// Fewer high-confidence signals than this means "no clear signal"
    pub min_high_confidence_signals: usize,
    /// Added to the mean confidence when more than one rule fires
    pub corroboration_bonus: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
            min_high_confidence_signals: DEFAULT_MIN_HIGH_CONFIDENCE_SIGNALS,
            corroboration_bonus: DEFAULT_CORROBORATION_BONUS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            high_confidence_threshold: std::env::var("SEA_HIGH_CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HIGH_CONFIDENCE_THRESHOLD),
            min_high_confidence_signals: std::env::var("SEA_MIN_HIGH_CONFIDENCE_SIGNALS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MIN_HIGH_CONFIDENCE_SIGNALS),
            corroboration_bonus: std::env::var("SEA_CORROBORATION_BONUS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CORROBORATION_BONUS),
        }
        .sanitized()
    }

    /// Pull out-of-range values back into [0, 10]; at least one
    /// high-confidence signal is always required.
    pub fn sanitized(mut self) -> Self {
        if !self.high_confidence_threshold.is_finite() {
            warn!(
                "Invalid high confidence threshold {}, using {}",
                self.high_confidence_threshold, DEFAULT_HIGH_CONFIDENCE_THRESHOLD
            );
            self.high_confidence_threshold = DEFAULT_HIGH_CONFIDENCE_THRESHOLD;
        }
        self.high_confidence_threshold = self.high_confidence_threshold.clamp(0.0, MAX_CONFIDENCE);

        if !self.corroboration_bonus.is_finite() {
            warn!(
                "Invalid corroboration bonus {}, using {}",
                self.corroboration_bonus, DEFAULT_CORROBORATION_BONUS
            );
            self.corroboration_bonus = DEFAULT_CORROBORATION_BONUS;
        }
        self.corroboration_bonus = self.corroboration_bonus.clamp(0.0, MAX_CONFIDENCE);

        self.min_high_confidence_signals = self.min_high_confidence_signals.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.high_confidence_threshold, 6.5);
        assert_eq!(config.min_high_confidence_signals, 1);
        assert_eq!(config.corroboration_bonus, 1.0);
    }

    #[test]
    fn test_sanitized_clamps() {
        let config = EngineConfig {
            high_confidence_threshold: f64::NAN,
            min_high_confidence_signals: 0,
            corroboration_bonus: -2.0,
        }
        .sanitized();
        assert_eq!(config.high_confidence_threshold, 6.5);
        assert_eq!(config.min_high_confidence_signals, 1);
        assert_eq!(config.corroboration_bonus, 0.0);
    }
}
