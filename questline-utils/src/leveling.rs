/// Cumulative XP needed to leave each level, starting at level 1.
pub const LEVEL_XP_THRESHOLDS: &[i64] = &[150, 350, 600, 900, 1250, 1650, 2100, 2600, 3150, 3750];

/// Outcome of applying an XP award to a level/XP pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelOutcome {
    pub level: i64,
    pub total_xp: i64,
    pub current_xp: i64,
    pub level_up: bool,
}

/// Cumulative XP at which `level` is left. Levels past the table keep the last gap.
pub fn xp_threshold(level: i64) -> i64 {
    if level <= 0 {
        return 0;
    }

    let index = usize::try_from(level - 1).unwrap_or(usize::MAX);
    if let Some(threshold) = LEVEL_XP_THRESHOLDS.get(index) {
        return *threshold;
    }

    let len = LEVEL_XP_THRESHOLDS.len();
    let last = LEVEL_XP_THRESHOLDS[len - 1];
    let gap = last - LEVEL_XP_THRESHOLDS[len - 2];
    let extra_levels = level - i64::try_from(len).unwrap_or(i64::MAX);
    last.saturating_add(gap.saturating_mul(extra_levels))
}

/// XP earned inside `level`, i.e. above the previous level's threshold.
pub fn current_xp_for(level: i64, total_xp: i64) -> i64 {
    (total_xp - xp_threshold(level - 1)).max(0)
}

/// Add `award` to `total_xp` and advance one level when the current
/// level's threshold is reached.
pub fn resolve_next_level(level: i64, total_xp: i64, award: i64) -> LevelOutcome {
    let level = level.max(1);
    let total_xp = total_xp.saturating_add(award.max(0));
    let level_up = total_xp >= xp_threshold(level);
    let level = if level_up { level + 1 } else { level };

    LevelOutcome {
        level,
        total_xp,
        current_xp: current_xp_for(level, total_xp),
        level_up,
    }
}

#[cfg(test)]
mod tests {
    use super::{LevelOutcome, current_xp_for, resolve_next_level, xp_threshold};

    #[test]
    fn thresholds_follow_table_then_extend() {
        assert_eq!(xp_threshold(0), 0);
        assert_eq!(xp_threshold(1), 150);
        assert_eq!(xp_threshold(10), 3750);
        assert_eq!(xp_threshold(11), 4350);
        assert_eq!(xp_threshold(12), 4950);
    }

    #[test]
    fn award_below_threshold_keeps_level() {
        assert_eq!(
            resolve_next_level(1, 0, 20),
            LevelOutcome {
                level: 1,
                total_xp: 20,
                current_xp: 20,
                level_up: false,
            }
        );
    }

    #[test]
    fn reaching_threshold_exactly_levels_up() {
        let outcome = resolve_next_level(1, 130, 20);
        assert!(outcome.level_up);
        assert_eq!(outcome.level, 2);
        assert_eq!(outcome.total_xp, 150);
        assert_eq!(outcome.current_xp, 0);
    }

    #[test]
    fn crossing_threshold_levels_up_once() {
        let outcome = resolve_next_level(2, 340, 60);
        assert_eq!(outcome.level, 3);
        assert_eq!(outcome.current_xp, 50);
    }

    #[test]
    fn zero_award_never_levels_up_below_threshold() {
        for xp in [0, 20, 149] {
            assert!(!resolve_next_level(1, xp, 0).level_up);
        }
    }

    #[test]
    fn current_xp_is_relative_to_previous_threshold() {
        assert_eq!(current_xp_for(1, 40), 40);
        assert_eq!(current_xp_for(3, 400), 50);
    }
}
