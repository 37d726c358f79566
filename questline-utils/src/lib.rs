/// Theoretical score grade tiers.
pub mod grade;
/// Java source lexer and structural rule matching.
pub mod java;
/// Level thresholds and XP resolution.
pub mod leveling;
/// Pure parser helpers.
pub mod parse;
/// Shared time helpers.
pub mod time;

/// XP granted for the first completion of a sub-level.
pub const SUB_LEVEL_XP_AWARD: i64 = 20;
