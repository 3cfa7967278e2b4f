//! Rule catalog and evaluator.
//!
//! Each rule is an independent predicate over a [`MarketContext`]. Rules
//! never fail: a field that did not parse simply keeps dependent rules
//! silent.

pub mod context;

pub use context::{MarketContext, ShareSplit, SpreadLine};

use crate::narrative::{Category, Narrative, StreakPolarity};
use crate::types::{MarketEntry, RuleId, Side, Signal, SignalDirection};
use crate::utils::matching::mentions_team;
use crate::utils::numeric::format_pct;
use tracing::debug;

/// Public bet share at which the crowd is considered lopsided
pub const PUBLIC_FADE_THRESHOLD: f64 = 70.0;
pub const PUBLIC_FADE_HEAVY_THRESHOLD: f64 = 80.0;
pub const BIG_SPREAD_THRESHOLD: f64 = 8.0;
pub const LINE_MOVE_THRESHOLD: f64 = 10.0;
pub const LINE_MOVE_HEAVY_THRESHOLD: f64 = 20.0;
pub const CLOSE_GAME_MIN_SPREAD: f64 = 1.5;
pub const CLOSE_GAME_MAX_SPREAD: f64 = 3.0;

/// What a rule produces when it fires; label and id come from the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Firing {
    pub direction: SignalDirection,
    pub confidence: f64,
    pub reason: String,
}

impl Firing {
    fn new(direction: SignalDirection, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            direction,
            confidence,
            reason: reason.into(),
        }
    }
}

/// One catalog entry
pub struct Rule {
    pub id: RuleId,
    pub label: &'static str,
    pub check: fn(&MarketContext<'_>) -> Option<Firing>,
}

impl Rule {
    pub fn apply(&self, ctx: &MarketContext<'_>) -> Option<Signal> {
        (self.check)(ctx).map(|firing| {
            Signal::new(
                self.id,
                self.label,
                firing.direction,
                firing.confidence,
                firing.reason,
            )
        })
    }
}

/// Canonical rule table, in evaluation order.
pub static RULE_CATALOG: &[Rule] = &[
    Rule {
        id: RuleId::PublicFade,
        label: "Public Fade",
        check: public_fade,
    },
    Rule {
        id: RuleId::SharpMoney,
        label: "Sharp Money",
        check: sharp_money,
    },
    Rule {
        id: RuleId::BigSpreadFade,
        label: "Big Spread Fade",
        check: big_spread_fade,
    },
    Rule {
        id: RuleId::LineMove,
        label: "Line Move",
        check: line_move,
    },
    Rule {
        id: RuleId::InjuryPanic,
        label: "Injury Panic",
        check: injury_panic,
    },
    Rule {
        id: RuleId::TradeShock,
        label: "Trade Shock",
        check: trade_shock,
    },
    Rule {
        id: RuleId::SuspensionShock,
        label: "Suspension Shock",
        check: suspension_shock,
    },
    Rule {
        id: RuleId::RevengeGame,
        label: "Revenge Game",
        check: revenge_game,
    },
    Rule {
        id: RuleId::B2bFatigue,
        label: "B2B Fatigue",
        check: b2b_fatigue,
    },
    Rule {
        id: RuleId::CloseGame,
        label: "Close Game",
        check: close_game,
    },
    Rule {
        id: RuleId::StreakReversion,
        label: "Streak Reversion",
        check: streak_reversion,
    },
];

/// Run every catalog rule against one entry.
pub fn evaluate(entry: &MarketEntry, narrative: &Narrative) -> Vec<Signal> {
    evaluate_context(&MarketContext::new(entry, narrative))
}

/// Run the catalog over an already-parsed entry.
pub fn evaluate_context(ctx: &MarketContext<'_>) -> Vec<Signal> {
    RULE_CATALOG
        .iter()
        .filter_map(|rule| {
            let signal = rule.apply(ctx)?;
            debug!(
                "{} vs {}: {} fired {} @ {:.1}",
                ctx.team(Side::A),
                ctx.team(Side::B),
                signal.rule_id,
                signal.direction.as_str(),
                signal.confidence
            );
            Some(signal)
        })
        .collect()
}

fn public_fade(ctx: &MarketContext<'_>) -> Option<Firing> {
    let bets = ctx.bets?;
    let pct = bets.max();
    if pct < PUBLIC_FADE_THRESHOLD {
        return None;
    }
    // An even split only comes from malformed input; it reads as side B heavy
    let heavy = bets.majority().unwrap_or(Side::B);
    let faded = heavy.other();
    let confidence = if pct >= PUBLIC_FADE_HEAVY_THRESHOLD { 7.5 } else { 6.5 };
    Some(Firing::new(
        SignalDirection::Long,
        confidence,
        format!(
            "{} of the public is on {}; the market is overextended, value on {}",
            format_pct(pct),
            ctx.team(heavy),
            ctx.pick(faded)
        ),
    ))
}

fn sharp_money(ctx: &MarketContext<'_>) -> Option<Firing> {
    let bets = ctx.bets?;
    let money = ctx.money?;
    let bet_side = bets.majority()?;
    let money_side = money.majority()?;
    if bet_side == money_side {
        return None;
    }
    Some(Firing::new(
        SignalDirection::Long,
        7.0,
        format!(
            "{} of the money is on {} against only {} of bets; professional action on {}",
            format_pct(money.of(money_side)),
            ctx.team(money_side),
            format_pct(bets.of(money_side)),
            ctx.pick(money_side)
        ),
    ))
}

fn big_spread_fade(ctx: &MarketContext<'_>) -> Option<Firing> {
    let line = ctx.spread?;
    let favorite = line.favorite()?;
    if line.magnitude() < BIG_SPREAD_THRESHOLD {
        return None;
    }
    Some(Firing::new(
        SignalDirection::Long,
        6.5,
        format!(
            "{} laying {} points looks inflated; take {} (mean reversion)",
            ctx.team(favorite),
            line.magnitude(),
            ctx.pick(favorite.other())
        ),
    ))
}

fn line_move(ctx: &MarketContext<'_>) -> Option<Firing> {
    let pct = ctx.line_move_pct?;
    let magnitude = pct.abs();
    if magnitude < LINE_MOVE_THRESHOLD {
        return None;
    }
    let direction = if pct > 0.0 {
        SignalDirection::Long
    } else {
        SignalDirection::Short
    };
    let confidence = if magnitude >= LINE_MOVE_HEAVY_THRESHOLD { 7.0 } else { 6.0 };
    let sign = if pct > 0.0 { "+" } else { "-" };
    Some(Firing::new(
        direction,
        confidence,
        format!(
            "Line moved {}{} since open; significant drift, possibly information-driven",
            sign,
            format_pct(magnitude)
        ),
    ))
}

fn injury_panic(ctx: &MarketContext<'_>) -> Option<Firing> {
    if !ctx.narrative.has(Category::Injury) {
        return None;
    }
    let (confidence, reason) = if ctx.narrative.star_player {
        (
            7.5,
            "Star or starter injury reported; public overreaction likely inflates the line",
        )
    } else {
        (
            5.5,
            "Injury news in the notes; public tends to overreact to availability",
        )
    };
    Some(Firing::new(SignalDirection::Long, confidence, reason))
}

fn trade_shock(ctx: &MarketContext<'_>) -> Option<Firing> {
    ctx.narrative.has(Category::Trade).then(|| {
        Firing::new(
            SignalDirection::Short,
            6.0,
            "Trade news or rumors unsettle the roster",
        )
    })
}

fn suspension_shock(ctx: &MarketContext<'_>) -> Option<Firing> {
    ctx.narrative.has(Category::Suspension).then(|| {
        Firing::new(
            SignalDirection::Long,
            5.5,
            "Suspension headline; public tends to overprice the absence",
        )
    })
}

fn revenge_game(ctx: &MarketContext<'_>) -> Option<Firing> {
    ctx.narrative.has(Category::Revenge).then(|| {
        Firing::new(
            SignalDirection::Long,
            7.0,
            "Revenge spot; strong motivation for an outsized effort",
        )
    })
}

fn b2b_fatigue(ctx: &MarketContext<'_>) -> Option<Firing> {
    ctx.narrative.has(Category::Fatigue).then(|| {
        Firing::new(
            SignalDirection::Short,
            5.5,
            "Back-to-back schedule; fatigued side tends to underperform",
        )
    })
}

fn close_game(ctx: &MarketContext<'_>) -> Option<Firing> {
    let line = ctx.spread?;
    let magnitude = line.magnitude();
    if !(CLOSE_GAME_MIN_SPREAD..=CLOSE_GAME_MAX_SPREAD).contains(&magnitude) {
        return None;
    }
    Some(Firing::new(
        SignalDirection::Neutral,
        5.0,
        format!(
            "Spread of {} points; expect a one-possession game",
            magnitude
        ),
    ))
}

/// Role of the team a streak narrative is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreakSubject {
    Favorite,
    Underdog,
    Unattributed,
}

fn streak_subject(ctx: &MarketContext<'_>) -> StreakSubject {
    let Some(favorite) = ctx.favorite() else {
        return StreakSubject::Unattributed;
    };
    let notes = &ctx.entry.free_text_notes;
    let mentioned = |side: Side| {
        let name = match side {
            Side::A => ctx.entry.team_a.trim(),
            Side::B => ctx.entry.team_b.trim(),
        };
        !name.is_empty() && mentions_team(notes, name)
    };
    match (mentioned(Side::A), mentioned(Side::B)) {
        (true, false) if favorite == Side::A => StreakSubject::Favorite,
        (true, false) => StreakSubject::Underdog,
        (false, true) if favorite == Side::B => StreakSubject::Favorite,
        (false, true) => StreakSubject::Underdog,
        _ => StreakSubject::Unattributed,
    }
}

fn streak_reversion(ctx: &MarketContext<'_>) -> Option<Firing> {
    let polarity = ctx.narrative.streak_polarity?;
    let subject = streak_subject(ctx);
    let firing = match (polarity, subject) {
        (StreakPolarity::Hot, StreakSubject::Underdog) => Firing::new(
            SignalDirection::Short,
            6.0,
            "Underdog on a hot run is overbought; expect reversion toward the favorite",
        ),
        (StreakPolarity::Hot, _) => Firing::new(
            SignalDirection::Long,
            6.0,
            "Hot-streak favorite is priced on momentum; fade the chalk",
        ),
        (StreakPolarity::Cold, StreakSubject::Favorite) => Firing::new(
            SignalDirection::Short,
            5.5,
            "Favorite on a cold run is oversold; expect reversion",
        ),
        (StreakPolarity::Cold, _) => Firing::new(
            SignalDirection::Long,
            5.5,
            "Cold-streak underdog is undervalued by the public",
        ),
    };
    Some(firing)
}
