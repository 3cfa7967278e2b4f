//! Trigger phrase tables.
//!
//! Matching is case-insensitive. ASCII phrases match whole words only;
//! phrases containing CJK characters match anywhere in the text. Bump
//! [`KEYWORD_TABLE_VERSION`] whenever a table changes so stored analyses can
//! be traced back to the vocabulary that produced them.

use super::Category;

pub const KEYWORD_TABLE_VERSION: u32 = 3;

pub const KEYWORD_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Injury,
        &[
            "injury",
            "injured",
            "injuries",
            "hurt",
            "out for",
            "ruled out",
            "sidelined",
            "questionable",
            "doubtful",
            "day-to-day",
            "game-time decision",
            "伤",
            "伤病",
            "伤停",
            "受伤",
            "缺阵",
        ],
    ),
    (
        Category::Trade,
        &[
            "trade",
            "traded",
            "trade rumor",
            "trade rumors",
            "trade request",
            "acquired",
            "waived",
            "signed",
            "交易",
            "传言",
            "被交易",
            "签约",
        ],
    ),
    (
        Category::Suspension,
        &[
            "suspended",
            "suspension",
            "ejected",
            "banned",
            "停赛",
            "禁赛",
            "禁赛处罚",
        ],
    ),
    (
        Category::Streak,
        &[
            "streak",
            "winning streak",
            "losing streak",
            "consecutive",
            "in a row",
            "straight wins",
            "straight losses",
            "skid",
            "slump",
            "连胜",
            "连败",
        ],
    ),
    (
        Category::Comeback,
        &[
            "comeback",
            "rally",
            "rallied",
            "overcame",
            "deficit",
            "逆转",
            "翻盘",
        ],
    ),
    (
        Category::Blowout,
        &[
            "blowout",
            "blown out",
            "rout",
            "routed",
            "crushed",
            "dominated",
            "大比分",
            "大胜",
            "惨败",
        ],
    ),
    (
        Category::Revenge,
        &["revenge", "rematch", "grudge", "payback", "复仇", "报仇"],
    ),
    (
        Category::Fatigue,
        &[
            "b2b",
            "back-to-back",
            "back to back",
            "second night",
            "fatigue",
            "tired legs",
            "long road trip",
            "背靠背",
            "疲劳",
            "连续客场",
        ],
    ),
];

/// Wording that puts a star or regular starter at the centre of the note
pub const STAR_PHRASES: &[&str] = &[
    "star",
    "stars",
    "superstar",
    "all-star",
    "starter",
    "starters",
    "mvp",
    "franchise player",
    "best player",
    "主力",
    "核心",
    "球星",
    "巨星",
    "首发",
];

pub const HOT_STREAK_PHRASES: &[&str] = &[
    "winning streak",
    "win streak",
    "hot streak",
    "straight wins",
    "wins in a row",
    "unbeaten",
    "comeback",
    "rally",
    "rallied",
    "连胜",
    "大胜",
    "逆转",
    "翻盘",
];

pub const COLD_STREAK_PHRASES: &[&str] = &[
    "losing streak",
    "cold streak",
    "straight losses",
    "losses in a row",
    "skid",
    "slump",
    "winless",
    "blown out",
    "routed",
    "连败",
    "惨败",
];
