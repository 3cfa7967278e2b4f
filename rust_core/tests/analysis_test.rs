//! End-to-end properties of the analysis engine
//!
//! Everything here goes through the public facade only.

use sea_rust_core::recommendation::NO_SIGNAL_MESSAGE;
use sea_rust_core::{
    analyze, classify, Category, MarketEntry, RuleId, SignalDirection, SignalEngine, Stance,
};

/// A spread of realistic and malformed entries
fn sample_entries() -> Vec<MarketEntry> {
    let spreads = [("-9", "+9"), ("+2.5", "-2.5"), ("PK", ""), ("", ""), ("abc", "1e400")];
    let bets = [("82", "18"), ("50", "50"), ("", "71%"), ("150", "-3")];
    let money = [("30", "70"), ("", ""), ("55", "45")];
    let line_moves = ["", "+12", "-25%", "−30", "wild"];
    let notes = [
        "",
        "star player injury, revenge game",
        "主力伤病 背靠背",
        "Lakers on a 7 game winning streak, trade rumors",
        "Pistons losing streak, starter suspended",
    ];

    let mut entries = Vec::new();
    for (i, spread) in spreads.iter().enumerate() {
        for (j, bet) in bets.iter().enumerate() {
            let m = money[(i + j) % money.len()];
            let lm = line_moves[(i * 2 + j) % line_moves.len()];
            let note = notes[(i + j * 3) % notes.len()];
            entries.push(
                MarketEntry::new("Lakers", "Pistons")
                    .with_spreads(spread.0, spread.1)
                    .with_bets(bet.0, bet.1)
                    .with_money(m.0, m.1)
                    .with_line_move(lm)
                    .with_notes(note),
            );
        }
    }
    entries.push(MarketEntry::default());
    entries
}

#[test]
fn test_no_triggers_means_no_signal() {
    let entry = MarketEntry::new("Lakers", "Pistons")
        .with_spreads("-5", "+5")
        .with_bets("55", "45")
        .with_money("57", "43")
        .with_line_move("4")
        .with_notes("home crowd expected to be loud");
    let result = analyze(&entry);

    assert!(result.signals.is_empty());
    assert_eq!(result.overall_score, 0.0);
    assert_eq!(result.recommendation, NO_SIGNAL_MESSAGE);
    assert_eq!(result.stance, Stance::NoSignal);
}

#[test]
fn test_score_bounds_and_invariants() {
    for entry in sample_entries() {
        let result = analyze(&entry);
        assert!(
            (0.0..=10.0).contains(&result.overall_score),
            "score {} out of range for {:?}",
            result.overall_score,
            entry
        );
        assert_eq!(result.overall_score == 0.0, result.signals.is_empty());
        assert!(!result.recommendation.is_empty());
        for signal in &result.signals {
            assert!((0.0..=10.0).contains(&signal.confidence));
            assert!(!signal.reason.is_empty());
        }
    }
}

#[test]
fn test_analysis_is_idempotent() {
    for entry in sample_entries() {
        assert_eq!(analyze(&entry), analyze(&entry));
    }
}

#[test]
fn test_batch_matches_sequential() {
    let entries = sample_entries();
    let engine = SignalEngine::default();
    let batch = engine.analyze_batch(&entries);
    assert_eq!(batch.len(), entries.len());
    for (entry, result) in entries.iter().zip(&batch) {
        assert_eq!(&engine.analyze(entry), result);
    }
}

#[test]
fn test_corroboration_monotonicity() {
    let single = analyze(&MarketEntry::new("Lakers", "Pistons").with_notes("revenge game"));
    let multi = analyze(
        &MarketEntry::new("Lakers", "Pistons")
            .with_bets("60", "40")
            .with_money("35", "65")
            .with_notes("revenge game"),
    );
    assert_eq!(single.signals.len(), 1);
    assert_eq!(multi.signals.len(), 2);
    assert!(multi.overall_score >= single.overall_score);
}

#[test]
fn test_spread_sign_correctness() {
    let result = analyze(&MarketEntry::new("Celtics", "Pistons").with_spreads("-9", "+9"));
    let fade = result.signal(RuleId::BigSpreadFade).expect("big spread should fire");
    assert_eq!(fade.direction, SignalDirection::Long);
    assert_eq!(result.stance, Stance::Long);
    assert!(result.recommendation.contains("Pistons +9"));

    // Team order reversed upstream: still the positive-spread side
    let result = analyze(&MarketEntry::new("Pistons", "Celtics").with_spreads("+9", "-9"));
    assert!(result.recommendation.contains("Pistons +9"));
}

#[test]
fn test_tie_resolution() {
    let result = analyze(
        &MarketEntry::new("Lakers", "Pistons")
            .with_notes("revenge game")
            .with_line_move("-25"),
    );
    let long = result.signal(RuleId::RevengeGame).unwrap();
    let short = result.signal(RuleId::LineMove).unwrap();
    assert_eq!((long.direction, long.confidence), (SignalDirection::Long, 7.0));
    assert_eq!((short.direction, short.confidence), (SignalDirection::Short, 7.0));
    assert_eq!(result.stance, Stance::Hold);
    assert!(result.recommendation.contains("Conflicting signals"));
}

#[test]
fn test_mixed_language_injury() {
    assert!(classify("主力伤病").contains(&Category::Injury));
    assert!(classify("star player injury").contains(&Category::Injury));

    let chinese = analyze(&MarketEntry::new("Lakers", "Pistons").with_notes("主力伤病"));
    let english = analyze(&MarketEntry::new("Lakers", "Pistons").with_notes("star player injury"));
    let a = chinese.signal(RuleId::InjuryPanic).unwrap();
    let b = english.signal(RuleId::InjuryPanic).unwrap();
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.confidence, 7.5);
}

#[test]
fn test_english_keyword_glued_to_chinese_text() {
    let result = analyze(&MarketEntry::new("Lakers", "Celtics").with_notes("湖人b2b"));
    assert!(result.signal(RuleId::B2bFatigue).is_some());

    let result = analyze(&MarketEntry::new("Lakers", "Celtics").with_notes("詹姆斯questionable"));
    assert!(result.signal(RuleId::InjuryPanic).is_some());
}

#[test]
fn test_public_fade_boundary() {
    let fade = |pct: &str| {
        analyze(&MarketEntry::new("Lakers", "Pistons").with_bets(pct, ""))
            .signal(RuleId::PublicFade)
            .map(|s| s.confidence)
    };
    assert_eq!(fade("69"), None);
    assert_eq!(fade("70"), Some(6.5));
    assert_eq!(fade("80"), Some(7.5));
}

#[test]
fn test_ocr_payload_is_analyzed() {
    let json = r#"{
        "team1": "Celtics", "team2": "Pistons",
        "spread1": "-9.5", "spread2": "+9.5",
        "bets1": 78, "bets2": 22,
        "money1": "40%", "money2": "60%",
        "lineMove": null,
        "notes": "Celtics 8 game winning streak",
        "gameTime": "2:00 AM"
    }"#;
    let entry: MarketEntry = serde_json::from_str(json).unwrap();
    let result = analyze(&entry);

    assert!(result.signal(RuleId::PublicFade).is_some());
    assert!(result.signal(RuleId::SharpMoney).is_some());
    assert!(result.signal(RuleId::BigSpreadFade).is_some());
    assert_eq!(
        result.signal(RuleId::StreakReversion).unwrap().direction,
        SignalDirection::Long
    );
    assert_eq!(result.stance, Stance::Long);
    assert!(result.recommendation.starts_with("Take Pistons +9.5"));
}
