//! Engine value types: market entries in, signals and analysis results out.
//!
//! Wire names are camelCase and stable; the downstream fusion step reads
//! persisted `AnalysisResult`s directly.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Upper bound of every confidence and score value.
pub const MAX_CONFIDENCE: f64 = 10.0;

/// One side of a two-team market, by input position.
///
/// Position carries no meaning for favored/receiving roles; those come
/// from the spread sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Signal direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    /// Bet the receiving (faded) side
    Long,
    /// Bet the favored (chalk) side
    Short,
    /// Informational only
    Neutral,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Long => "LONG",
            SignalDirection::Short => "SHORT",
            SignalDirection::Neutral => "NEUTRAL",
        }
    }
}

/// Stable identifiers of the rule catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    PublicFade,
    SharpMoney,
    BigSpreadFade,
    LineMove,
    InjuryPanic,
    TradeShock,
    SuspensionShock,
    RevengeGame,
    B2bFatigue,
    CloseGame,
    StreakReversion,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::PublicFade => "PUBLIC_FADE",
            RuleId::SharpMoney => "SHARP_MONEY",
            RuleId::BigSpreadFade => "BIG_SPREAD_FADE",
            RuleId::LineMove => "LINE_MOVE",
            RuleId::InjuryPanic => "INJURY_PANIC",
            RuleId::TradeShock => "TRADE_SHOCK",
            RuleId::SuspensionShock => "SUSPENSION_SHOCK",
            RuleId::RevengeGame => "REVENGE_GAME",
            RuleId::B2bFatigue => "B2B_FATIGUE",
            RuleId::CloseGame => "CLOSE_GAME",
            RuleId::StreakReversion => "STREAK_REVERSION",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured description of one betting market, as supplied by the
/// upload surface (manual form, pasted text or OCR output).
///
/// Every field is a raw display string; an empty string means absent.
/// Aliases accept the screenshot-parser field names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketEntry {
    #[serde(default, alias = "team1", deserialize_with = "lenient_string")]
    pub team_a: String,
    #[serde(default, alias = "team2", deserialize_with = "lenient_string")]
    pub team_b: String,
    #[serde(default, alias = "spread1", deserialize_with = "lenient_string")]
    pub spread_a: String,
    #[serde(default, alias = "spread2", deserialize_with = "lenient_string")]
    pub spread_b: String,
    #[serde(default, alias = "moneyline1", deserialize_with = "lenient_string")]
    pub moneyline_a: String,
    #[serde(default, alias = "moneyline2", deserialize_with = "lenient_string")]
    pub moneyline_b: String,
    #[serde(default, alias = "bets1", deserialize_with = "lenient_string")]
    pub bets_share_pct_a: String,
    #[serde(default, alias = "bets2", deserialize_with = "lenient_string")]
    pub bets_share_pct_b: String,
    #[serde(default, alias = "money1", deserialize_with = "lenient_string")]
    pub money_share_pct_a: String,
    #[serde(default, alias = "money2", deserialize_with = "lenient_string")]
    pub money_share_pct_b: String,
    #[serde(default, alias = "lineMove", deserialize_with = "lenient_string")]
    pub line_move_pct: String,
    #[serde(default, alias = "notes", deserialize_with = "lenient_string")]
    pub free_text_notes: String,
    /// Display-only tip-off time ("2:00 AM")
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "lenient_string")]
    pub game_time: String,
}

impl MarketEntry {
    pub fn new(team_a: impl Into<String>, team_b: impl Into<String>) -> Self {
        Self {
            team_a: team_a.into(),
            team_b: team_b.into(),
            ..Default::default()
        }
    }

    pub fn with_spreads(mut self, spread_a: &str, spread_b: &str) -> Self {
        self.spread_a = spread_a.to_string();
        self.spread_b = spread_b.to_string();
        self
    }

    pub fn with_moneylines(mut self, moneyline_a: &str, moneyline_b: &str) -> Self {
        self.moneyline_a = moneyline_a.to_string();
        self.moneyline_b = moneyline_b.to_string();
        self
    }

    pub fn with_bets(mut self, bets_a: &str, bets_b: &str) -> Self {
        self.bets_share_pct_a = bets_a.to_string();
        self.bets_share_pct_b = bets_b.to_string();
        self
    }

    pub fn with_money(mut self, money_a: &str, money_b: &str) -> Self {
        self.money_share_pct_a = money_a.to_string();
        self.money_share_pct_b = money_b.to_string();
        self
    }

    pub fn with_line_move(mut self, line_move_pct: &str) -> Self {
        self.line_move_pct = line_move_pct.to_string();
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.free_text_notes = notes.to_string();
        self
    }

    /// Display name for a side, falling back to a positional label.
    pub fn team(&self, side: Side) -> &str {
        let name = match side {
            Side::A => self.team_a.trim(),
            Side::B => self.team_b.trim(),
        };
        if !name.is_empty() {
            return name;
        }
        match side {
            Side::A => "Side A",
            Side::B => "Side B",
        }
    }

    pub fn raw_spread(&self, side: Side) -> &str {
        match side {
            Side::A => self.spread_a.trim(),
            Side::B => self.spread_b.trim(),
        }
    }

    pub fn raw_bets(&self, side: Side) -> &str {
        match side {
            Side::A => self.bets_share_pct_a.trim(),
            Side::B => self.bets_share_pct_b.trim(),
        }
    }

    pub fn raw_money(&self, side: Side) -> &str {
        match side {
            Side::A => self.money_share_pct_a.trim(),
            Side::B => self.money_share_pct_b.trim(),
        }
    }

    pub fn raw_moneyline(&self, side: Side) -> &str {
        match side {
            Side::A => self.moneyline_a.trim(),
            Side::B => self.moneyline_b.trim(),
        }
    }
}

/// Accepts strings, numbers, booleans or null; null becomes "".
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        Some(Raw::Flag(b)) => b.to_string(),
        None => String::new(),
    })
}

/// One fired rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub rule_id: RuleId,
    pub label: String,
    pub direction: SignalDirection,
    /// Always within [0, 10]
    pub confidence: f64,
    pub reason: String,
}

impl Signal {
    /// Build a signal, clamping confidence into [0, 10] (NaN becomes 0).
    pub fn new(
        rule_id: RuleId,
        label: impl Into<String>,
        direction: SignalDirection,
        confidence: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            label: label.into(),
            direction,
            confidence: clamp_confidence(rule_id, confidence),
            reason: reason.into(),
        }
    }

    pub fn is_directional(&self) -> bool {
        self.direction != SignalDirection::Neutral
    }
}

fn clamp_confidence(rule_id: RuleId, confidence: f64) -> f64 {
    if confidence.is_nan() {
        warn!("Rule {} produced NaN confidence, using 0", rule_id);
        return 0.0;
    }
    if !(0.0..=MAX_CONFIDENCE).contains(&confidence) {
        warn!(
            "Rule {} confidence {} outside [0, {}], clamping",
            rule_id, confidence, MAX_CONFIDENCE
        );
    }
    confidence.clamp(0.0, MAX_CONFIDENCE)
}

/// Machine-readable form of the recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stance {
    /// Back the receiving side
    Long,
    /// Back the favored side
    Short,
    /// High-confidence signals disagree
    Hold,
    /// Nothing actionable yet
    NoSignal,
}

/// Output of one analysis, 1:1 with the entry it was computed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// In rule evaluation order
    pub signals: Vec<Signal>,
    /// [0, 10], one decimal
    pub overall_score: f64,
    pub recommendation: String,
    pub stance: Stance,
}

impl AnalysisResult {
    pub fn has_signals(&self) -> bool {
        !self.signals.is_empty()
    }

    pub fn signal(&self, rule_id: RuleId) -> Option<&Signal> {
        self.signals.iter().find(|s| s.rule_id == rule_id)
    }
}
