use serde::{Deserialize, Serialize};

/// Highest score accepted for a theoretical quiz.
pub const MAX_SCORE: u32 = 100;

pub const SILVER_MIN_SCORE: u32 = 50;
pub const GOLD_MIN_SCORE: u32 = 80;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    #[default]
    None,
    Silver,
    Gold,
}

impl Grade {
    pub fn for_score(score: u32) -> Self {
        if score >= GOLD_MIN_SCORE {
            Self::Gold
        } else if score >= SILVER_MIN_SCORE {
            Self::Silver
        } else {
            Self::None
        }
    }

    /// Cumulative XP granted for holding this grade.
    pub fn xp(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Silver => 30,
            Self::Gold => 60,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}
