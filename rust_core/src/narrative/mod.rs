//! Narrative classification of free-text notes and headlines.
//!
//! The trigger vocabulary lives in plain phrase tables (see [`phrases`]);
//! this module compiles them once into regex sets and answers three
//! questions about a text: which categories it touches, whether it names a
//! star/starter, and which way a streak narrative points.

pub mod phrases;

use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

pub use phrases::{
    COLD_STREAK_PHRASES, HOT_STREAK_PHRASES, KEYWORD_TABLE, KEYWORD_TABLE_VERSION, STAR_PHRASES,
};

/// Narrative category detected in notes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Injury,
    Trade,
    Suspension,
    Streak,
    Comeback,
    Blowout,
    Revenge,
    Fatigue,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Injury,
        Category::Trade,
        Category::Suspension,
        Category::Streak,
        Category::Comeback,
        Category::Blowout,
        Category::Revenge,
        Category::Fatigue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Injury => "INJURY",
            Category::Trade => "TRADE",
            Category::Suspension => "SUSPENSION",
            Category::Streak => "STREAK",
            Category::Comeback => "COMEBACK",
            Category::Blowout => "BLOWOUT",
            Category::Revenge => "REVENGE",
            Category::Fatigue => "FATIGUE",
        }
    }

    /// Categories that describe recent form rather than roster news.
    pub fn is_form(&self) -> bool {
        matches!(self, Category::Streak | Category::Comeback | Category::Blowout)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type CategorySet = BTreeSet<Category>;

/// Direction of a form narrative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreakPolarity {
    /// Winning run, comeback, dominant win
    Hot,
    /// Losing run, heavy defeat
    Cold,
}

/// Everything the rules need from the notes, read once per analysis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Narrative {
    pub categories: CategorySet,
    pub star_player: bool,
    pub streak_polarity: Option<StreakPolarity>,
}

impl Narrative {
    pub fn has(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    pub fn has_form(&self) -> bool {
        self.categories.iter().any(Category::is_form)
    }
}

struct CompiledTables {
    categories: RegexSet,
    category_order: Vec<Category>,
    star: Regex,
    hot: Regex,
    cold: Regex,
}

static TABLES: OnceLock<CompiledTables> = OnceLock::new();

fn tables() -> &'static CompiledTables {
    TABLES.get_or_init(|| {
        let category_order: Vec<Category> = KEYWORD_TABLE.iter().map(|(c, _)| *c).collect();
        let patterns: Vec<String> = KEYWORD_TABLE
            .iter()
            .map(|(_, phrases)| alternation(phrases))
            .collect();

        CompiledTables {
            categories: RegexSetBuilder::new(&patterns)
                .case_insensitive(true)
                .build()
                .unwrap_or_else(|e| panic!("keyword table v{} invalid: {}", KEYWORD_TABLE_VERSION, e)),
            category_order,
            star: compile(STAR_PHRASES),
            hot: compile(HOT_STREAK_PHRASES),
            cold: compile(COLD_STREAK_PHRASES),
        }
    })
}

fn compile(phrases: &[&str]) -> Regex {
    RegexBuilder::new(&alternation(phrases))
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("phrase table v{} invalid: {}", KEYWORD_TABLE_VERSION, e))
}

/// Edge of an ASCII word. Unicode `\b` counts CJK as word characters, so
/// "湖人b2b" would have no boundary before "b2b".
const ASCII_EDGE_START: &str = "(?:^|[^A-Za-z0-9_])";
const ASCII_EDGE_END: &str = "(?:$|[^A-Za-z0-9_])";

fn is_ascii_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// One alternation per table. ASCII phrases must not continue an ASCII word
/// ("out for" must not fire on "without"); CJK text has no word breaks, so
/// those phrases match anywhere.
fn alternation(phrases: &[&str]) -> String {
    let arms: Vec<String> = phrases
        .iter()
        .map(|phrase| {
            let escaped = regex::escape(phrase);
            if !phrase.is_ascii() {
                return escaped;
            }
            let start = match phrase.chars().next() {
                Some(c) if is_ascii_word_char(c) => ASCII_EDGE_START,
                _ => "",
            };
            let end = match phrase.chars().last() {
                Some(c) if is_ascii_word_char(c) => ASCII_EDGE_END,
                _ => "",
            };
            format!("{}{}{}", start, escaped, end)
        })
        .collect();
    format!("(?:{})", arms.join("|"))
}

/// Categories touched by `text`. Total; empty text yields the empty set.
pub fn classify(text: &str) -> CategorySet {
    if text.trim().is_empty() {
        return CategorySet::new();
    }
    let tables = tables();
    tables
        .categories
        .matches(text)
        .into_iter()
        .map(|idx| tables.category_order[idx])
        .collect()
}

/// Does the text single out a star or regular starter?
pub fn mentions_star(text: &str) -> bool {
    !text.trim().is_empty() && tables().star.is_match(text)
}

/// Which way a form narrative points, given the categories already found.
///
/// Cold only when the text carries cold wording and no hot wording; any
/// other form narrative reads as hot.
pub fn streak_polarity(text: &str, categories: &CategorySet) -> Option<StreakPolarity> {
    if !categories.iter().any(Category::is_form) {
        return None;
    }
    let tables = tables();
    let hot = tables.hot.is_match(text);
    let cold = tables.cold.is_match(text);
    if cold && !hot {
        Some(StreakPolarity::Cold)
    } else {
        Some(StreakPolarity::Hot)
    }
}

/// Full read of a note: categories, star flag, streak polarity.
pub fn read(text: &str) -> Narrative {
    let categories = classify(text);
    let star_player = mentions_star(text);
    let streak_polarity = streak_polarity(text, &categories);
    Narrative {
        categories,
        star_player,
        streak_polarity,
    }
}
