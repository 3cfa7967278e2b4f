//! Parsed, validated view of a market entry.
//!
//! Raw display strings are read once into optional numeric values so every
//! rule predicate is a plain function over `Option`s.

use crate::narrative::Narrative;
use crate::types::{MarketEntry, Side};
use crate::utils::numeric::{format_spread, parse_number, parse_share_pct, parse_spread};
use tracing::debug;

/// Point spread of both sides. `a == -b` always holds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpreadLine {
    a: f64,
}

impl SpreadLine {
    /// Build from the two raw sides. Side A wins when both parse.
    pub fn from_sides(a: Option<f64>, b: Option<f64>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => {
                if a != -b {
                    debug!("Spread sides disagree ({} vs {}), using side A", a, b);
                }
                Some(Self { a })
            }
            (Some(a), None) => Some(Self { a }),
            (None, Some(b)) => Some(Self { a: -b }),
            (None, None) => None,
        }
    }

    /// Parse both raw spreads of an entry.
    pub fn of_entry(entry: &MarketEntry) -> Option<Self> {
        Self::from_sides(
            parse_spread(entry.raw_spread(Side::A)),
            parse_spread(entry.raw_spread(Side::B)),
        )
    }

    pub fn of(&self, side: Side) -> f64 {
        match side {
            Side::A => self.a,
            Side::B => -self.a,
        }
    }

    /// Points the favorite lays
    pub fn magnitude(&self) -> f64 {
        self.a.abs()
    }

    /// Side with the negative spread; none on a pick'em.
    pub fn favorite(&self) -> Option<Side> {
        if self.a < 0.0 {
            Some(Side::A)
        } else if self.a > 0.0 {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Side receiving points; none on a pick'em.
    pub fn receiving(&self) -> Option<Side> {
        self.favorite().map(Side::other)
    }

    pub fn display(&self, side: Side) -> String {
        format_spread(self.of(side))
    }
}

/// Percentage split of bets or money across the two sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShareSplit {
    a: f64,
    b: f64,
}

impl ShareSplit {
    /// Build from the two raw sides, inferring a missing side as `100 - x`.
    pub fn from_sides(a: Option<f64>, b: Option<f64>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(Self { a, b }),
            (Some(a), None) => Some(Self { a, b: 100.0 - a }),
            (None, Some(b)) => Some(Self { a: 100.0 - b, b }),
            (None, None) => None,
        }
    }

    pub fn of(&self, side: Side) -> f64 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    /// Side holding a strict majority; none on an even split.
    pub fn majority(&self) -> Option<Side> {
        if self.a > self.b {
            Some(Side::A)
        } else if self.b > self.a {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn max(&self) -> f64 {
        self.a.max(self.b)
    }
}

/// Everything a rule may look at for one entry.
#[derive(Clone, Debug)]
pub struct MarketContext<'a> {
    pub entry: &'a MarketEntry,
    pub narrative: &'a Narrative,
    pub spread: Option<SpreadLine>,
    pub bets: Option<ShareSplit>,
    pub money: Option<ShareSplit>,
    pub line_move_pct: Option<f64>,
}

impl<'a> MarketContext<'a> {
    pub fn new(entry: &'a MarketEntry, narrative: &'a Narrative) -> Self {
        let spread = SpreadLine::of_entry(entry);
        let bets = ShareSplit::from_sides(
            parse_share_pct(entry.raw_bets(Side::A)),
            parse_share_pct(entry.raw_bets(Side::B)),
        );
        let money = ShareSplit::from_sides(
            parse_share_pct(entry.raw_money(Side::A)),
            parse_share_pct(entry.raw_money(Side::B)),
        );
        let line_move_pct = parse_number(&entry.line_move_pct);

        Self {
            entry,
            narrative,
            spread,
            bets,
            money,
            line_move_pct,
        }
    }

    pub fn team(&self, side: Side) -> &str {
        self.entry.team(side)
    }

    pub fn favorite(&self) -> Option<Side> {
        self.spread.and_then(|line| line.favorite())
    }

    /// "Lakers +9", or just "Lakers" when no spread is known.
    pub fn pick(&self, side: Side) -> String {
        match self.spread {
            Some(line) => format!("{} {}", self.team(side), line.display(side)),
            None => self.team(side).to_string(),
        }
    }
}
