//! Recommendation synthesis.
//!
//! Only high-confidence directional signals vote. The favored and receiving
//! sides always come from the spread sign, never from input position.

use crate::config::EngineConfig;
use crate::rules::SpreadLine;
use crate::types::{MarketEntry, Signal, SignalDirection, Stance};

pub const NO_SIGNAL_MESSAGE: &str = "No clear signal; provisional, awaiting live-market fusion";

/// Recommendation text plus its machine-readable stance
#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub stance: Stance,
    pub text: String,
}

impl Recommendation {
    fn no_signal() -> Self {
        Self {
            stance: Stance::NoSignal,
            text: NO_SIGNAL_MESSAGE.to_string(),
        }
    }
}

/// Synthesize with the default configuration.
pub fn synthesize(entry: &MarketEntry, signals: &[Signal]) -> Recommendation {
    synthesize_with(entry, signals, &EngineConfig::default())
}

pub fn synthesize_with(
    entry: &MarketEntry,
    signals: &[Signal],
    config: &EngineConfig,
) -> Recommendation {
    synthesize_on_line(entry, SpreadLine::of_entry(entry), signals, config)
}

/// Synthesize against a spread line the caller already parsed.
pub fn synthesize_on_line(
    entry: &MarketEntry,
    line: Option<SpreadLine>,
    signals: &[Signal],
    config: &EngineConfig,
) -> Recommendation {
    let high: Vec<&Signal> = signals
        .iter()
        .filter(|s| s.confidence >= config.high_confidence_threshold)
        .collect();
    if high.len() < config.min_high_confidence_signals.max(1) {
        return Recommendation::no_signal();
    }

    let longs: Vec<&Signal> = high
        .iter()
        .copied()
        .filter(|s| s.direction == SignalDirection::Long)
        .collect();
    let shorts: Vec<&Signal> = high
        .iter()
        .copied()
        .filter(|s| s.direction == SignalDirection::Short)
        .collect();

    if longs.len() > shorts.len() {
        Recommendation {
            stance: Stance::Long,
            text: directional(entry, line, Stance::Long, &longs),
        }
    } else if shorts.len() > longs.len() {
        Recommendation {
            stance: Stance::Short,
            text: directional(entry, line, Stance::Short, &shorts),
        }
    } else if !longs.is_empty() {
        Recommendation {
            stance: Stance::Hold,
            text: format!(
                "Conflicting signals ({} long vs {} short); hold",
                longs.len(),
                shorts.len()
            ),
        }
    } else {
        Recommendation::no_signal()
    }
}

fn directional(
    entry: &MarketEntry,
    line: Option<SpreadLine>,
    stance: Stance,
    contributors: &[&Signal],
) -> String {
    let labels = contributor_labels(contributors);
    let role = if stance == Stance::Long {
        "receiving side"
    } else {
        "favored side"
    };
    let side = line.and_then(|line| match stance {
        Stance::Long => line.receiving(),
        _ => line.favorite(),
    });

    match (line, side) {
        (Some(line), Some(side)) => format!(
            "Take {} {} ({}: {})",
            entry.team(side),
            line.display(side),
            role,
            labels
        ),
        _ => format!(
            "Lean {}; no spread to identify it ({})",
            role, labels
        ),
    }
}

/// Distinct labels in signal order, joined with " + ".
fn contributor_labels(contributors: &[&Signal]) -> String {
    let mut labels: Vec<&str> = Vec::with_capacity(contributors.len());
    for signal in contributors {
        if !labels.contains(&signal.label.as_str()) {
            labels.push(signal.label.as_str());
        }
    }
    labels.join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleId;

    fn signal(rule_id: RuleId, label: &str, direction: SignalDirection, confidence: f64) -> Signal {
        Signal::new(rule_id, label, direction, confidence, "test")
    }

    fn entry() -> MarketEntry {
        MarketEntry::new("Celtics", "Pistons").with_spreads("-9", "+9")
    }

    #[test]
    fn test_no_signals() {
        let rec = synthesize(&entry(), &[]);
        assert_eq!(rec.stance, Stance::NoSignal);
        assert_eq!(rec.text, NO_SIGNAL_MESSAGE);
    }

    #[test]
    fn test_low_confidence_only() {
        let signals = [signal(RuleId::B2bFatigue, "B2B Fatigue", SignalDirection::Short, 5.5)];
        assert_eq!(synthesize(&entry(), &signals).stance, Stance::NoSignal);
    }

    #[test]
    fn test_long_names_receiving_side() {
        let signals = [
            signal(RuleId::BigSpreadFade, "Big Spread Fade", SignalDirection::Long, 6.5),
            signal(RuleId::RevengeGame, "Revenge Game", SignalDirection::Long, 7.0),
        ];
        let rec = synthesize(&entry(), &signals);
        assert_eq!(rec.stance, Stance::Long);
        assert_eq!(
            rec.text,
            "Take Pistons +9 (receiving side: Big Spread Fade + Revenge Game)"
        );
    }

    #[test]
    fn test_short_names_favored_side_regardless_of_order() {
        let signals = [signal(RuleId::TradeShock, "Trade Shock", SignalDirection::Short, 7.0)];
        let flipped = MarketEntry::new("Pistons", "Celtics").with_spreads("+9", "-9");
        let rec = synthesize(&flipped, &signals);
        assert_eq!(rec.stance, Stance::Short);
        assert!(rec.text.starts_with("Take Celtics -9"));
    }

    #[test]
    fn test_tie_is_hold() {
        let signals = [
            signal(RuleId::RevengeGame, "Revenge Game", SignalDirection::Long, 7.0),
            signal(RuleId::LineMove, "Line Move", SignalDirection::Short, 7.0),
        ];
        let rec = synthesize(&entry(), &signals);
        assert_eq!(rec.stance, Stance::Hold);
        assert!(rec.text.contains("hold"));
    }

    #[test]
    fn test_neutral_does_not_vote() {
        let signals = [signal(RuleId::CloseGame, "Close Game", SignalDirection::Neutral, 7.0)];
        assert_eq!(synthesize(&entry(), &signals).stance, Stance::NoSignal);
    }

    #[test]
    fn test_missing_spread_names_lean() {
        let signals = [signal(RuleId::RevengeGame, "Revenge Game", SignalDirection::Long, 7.0)];
        let rec = synthesize(&MarketEntry::new("Celtics", "Pistons"), &signals);
        assert_eq!(rec.stance, Stance::Long);
        assert!(rec.text.starts_with("Lean receiving side"));

        let pickem = MarketEntry::new("Celtics", "Pistons").with_spreads("PK", "PK");
        assert!(synthesize(&pickem, &signals).text.starts_with("Lean receiving side"));
    }

    #[test]
    fn test_uses_the_line_it_is_given() {
        let signals = [signal(RuleId::RevengeGame, "Revenge Game", SignalDirection::Long, 7.0)];
        let line = SpreadLine::from_sides(Some(-6.5), None);
        let bare = MarketEntry::new("Celtics", "Pistons");

        let rec = synthesize_on_line(&bare, line, &signals, &EngineConfig::default());
        assert!(rec.text.starts_with("Take Pistons +6.5"));

        let rec = synthesize_on_line(&entry(), None, &signals, &EngineConfig::default());
        assert!(rec.text.starts_with("Lean receiving side"));
    }

    #[test]
    fn test_min_high_confidence_signals() {
        let config = EngineConfig {
            min_high_confidence_signals: 2,
            ..EngineConfig::default()
        };
        let one = [signal(RuleId::RevengeGame, "Revenge Game", SignalDirection::Long, 7.0)];
        assert_eq!(synthesize_with(&entry(), &one, &config).stance, Stance::NoSignal);

        let two = [
            signal(RuleId::RevengeGame, "Revenge Game", SignalDirection::Long, 7.0),
            signal(RuleId::SharpMoney, "Sharp Money", SignalDirection::Long, 7.0),
        ];
        assert_eq!(synthesize_with(&entry(), &two, &config).stance, Stance::Long);
    }
}
