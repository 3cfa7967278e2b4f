//! Analysis facade: classify notes, run the rule catalog, score and
//! synthesize a recommendation.
//!
//! Analysis is pure and holds no state between calls, so a single
//! `SignalEngine` can be shared freely across threads.

use crate::config::EngineConfig;
use crate::narrative;
use crate::recommendation::synthesize_on_line;
use crate::rules::{evaluate_context, MarketContext};
use crate::scoring::aggregate_with_bonus;
use crate::types::{AnalysisResult, MarketEntry};
use rayon::prelude::*;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct SignalEngine {
    config: EngineConfig,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one entry. Total: malformed fields only silence rules.
    pub fn analyze(&self, entry: &MarketEntry) -> AnalysisResult {
        let narrative = narrative::read(&entry.free_text_notes);
        let ctx = MarketContext::new(entry, &narrative);
        let signals = evaluate_context(&ctx);
        let overall_score = aggregate_with_bonus(&signals, self.config.corroboration_bonus);
        let recommendation = synthesize_on_line(entry, ctx.spread, &signals, &self.config);

        debug!(
            "Analyzed {} vs {}: {} signals, score {:.1}, {:?}",
            entry.team_a,
            entry.team_b,
            signals.len(),
            overall_score,
            recommendation.stance
        );

        AnalysisResult {
            signals,
            overall_score,
            recommendation: recommendation.text,
            stance: recommendation.stance,
        }
    }

    /// Analyze independent entries in parallel; output order matches input.
    pub fn analyze_batch(&self, entries: &[MarketEntry]) -> Vec<AnalysisResult> {
        entries.par_iter().map(|entry| self.analyze(entry)).collect()
    }
}

/// Analyze one entry with the default configuration.
pub fn analyze(entry: &MarketEntry) -> AnalysisResult {
    SignalEngine::default().analyze(entry)
}
