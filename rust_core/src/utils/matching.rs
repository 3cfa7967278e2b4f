//! Team mention detection in operator notes.
//!
//! Notes are short and hand-typed ("Lakers on a 6 game winning streak",
//! "湖人三连败"), so matching is deliberately shallow: exact phrase first,
//! then a fuzzy match on the team's distinctive words to absorb typos.

use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a fuzzy word match
const FUZZY_WORD_THRESHOLD: f64 = 0.92;

/// Words shorter than this never match fuzzily ("LA", "NY")
const MIN_FUZZY_WORD_LEN: usize = 4;

/// Location and filler words that identify no team on their own
const GENERIC_WORDS: &[&str] = &[
    "the", "new", "los", "angeles", "san", "city", "state", "united", "york", "saint", "st",
    "team", "club", "fc",
];

/// Normalize a string for comparison
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenize into words
fn tokenize(s: &str) -> Vec<String> {
    normalize(s)
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// Check if text contains phrase as whole words (not substring of another word)
fn contains_phrase(text_words: &[String], phrase_words: &[String]) -> bool {
    if phrase_words.is_empty() || phrase_words.len() > text_words.len() {
        return false;
    }
    text_words
        .windows(phrase_words.len())
        .any(|window| window == phrase_words)
}

fn is_generic_word(word: &str) -> bool {
    GENERIC_WORDS.contains(&word)
}

/// Does `text` mention `team_name`?
///
/// Matches, in order: the full normalized name as a phrase, the full name
/// as a raw substring when it contains no ASCII letters (CJK names are not
/// whitespace-delimited), then any distinctive word of the name fuzzily.
pub fn mentions_team(text: &str, team_name: &str) -> bool {
    let team_words = tokenize(team_name);
    let text_words = tokenize(text);
    if team_words.is_empty() || text_words.is_empty() {
        return false;
    }

    if contains_phrase(&text_words, &team_words) {
        return true;
    }

    let team_norm = team_words.join(" ");
    if !team_norm.chars().any(|c| c.is_ascii_alphabetic()) {
        return normalize(text).contains(&team_norm);
    }

    team_words
        .iter()
        .filter(|w| w.chars().count() >= MIN_FUZZY_WORD_LEN && !is_generic_word(w))
        .any(|team_word| {
            text_words
                .iter()
                .any(|text_word| jaro_winkler(team_word, text_word) >= FUZZY_WORD_THRESHOLD)
        })
}
