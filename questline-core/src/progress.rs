//! Deterministic profile state transitions.
//!
//! Everything here is pure: handlers load a profile, call one of these, and
//! persist the result.

use serde::Serialize;
use thiserror::Error;

use questline_database::model::course::Course;
use questline_database::model::profile::{ProfileStats, UserProfile};
use questline_utils::SUB_LEVEL_XP_AWARD;
use questline_utils::grade::Grade;
use questline_utils::leveling::resolve_next_level;

/// Avatars a learner may pick.
pub const PETS: &[&str] = &["cat", "dog", "dragon", "fox", "owl"];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AwardOutcome {
    pub xp_awarded: i64,
    pub level_up: bool,
    pub badges_awarded: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TheoreticalOutcome {
    /// Submitted score minus the stored one. Only positive values were applied.
    pub score_difference: i64,
    pub grade: Grade,
    #[serde(flatten)]
    pub award: AwardOutcome,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown pet `{0}`")]
pub struct UnknownPet(pub String);

pub fn completion_badge(course_id: u64) -> String {
    format!("course-{course_id}-complete")
}

pub fn gold_badge(course_id: u64) -> String {
    format!("course-{course_id}-gold")
}

fn apply_xp(stats: &mut ProfileStats, award: i64) -> bool {
    if award <= 0 {
        return false;
    }

    let outcome = resolve_next_level(stats.level, stats.total_xp, award);
    stats.level = outcome.level;
    stats.total_xp = outcome.total_xp;
    stats.current_xp = outcome.current_xp;
    outcome.level_up
}

/// Record a fully validated sub-level.
///
/// `current` moves past the sub-level (never backwards, never past the last
/// one). XP is granted only the first time a sub-level completes.
pub fn complete_sub_level(profile: &mut UserProfile, course: &Course, sub_level: u32) -> AwardOutcome {
    let progress = profile.course_mut(course.id);
    let newly_completed = progress.mark_completed(sub_level);

    let next = sub_level.saturating_add(1).min(course.sub_levels.max(1));
    progress.current = progress.current.max(next);

    let course_done = (1..=course.sub_levels).all(|level| progress.is_completed(level));

    let mut outcome = AwardOutcome::default();
    if !newly_completed {
        return outcome;
    }

    outcome.xp_awarded = SUB_LEVEL_XP_AWARD;
    outcome.level_up = apply_xp(&mut profile.profile, SUB_LEVEL_XP_AWARD);

    let badge = completion_badge(course.id);
    if course_done && profile.grant_badge(&badge) {
        outcome.badges_awarded.push(badge);
    }

    outcome
}

/// Ratchet the theoretical score upwards and grant grade XP once per tier.
pub fn record_theoretical_score(
    profile: &mut UserProfile,
    course: &Course,
    score: u32,
) -> TheoreticalOutcome {
    let record = &mut profile.course_mut(course.id).theoretical;
    let score_difference = i64::from(score) - i64::from(record.score);

    if score_difference <= 0 {
        return TheoreticalOutcome {
            score_difference,
            grade: record.grade,
            award: AwardOutcome::default(),
        };
    }

    let previous_grade = record.grade;
    let grade = Grade::for_score(score).max(previous_grade);
    record.score = score;
    record.grade = grade;

    let xp_awarded = (grade.xp() - previous_grade.xp()).max(0);
    let mut award = AwardOutcome {
        xp_awarded,
        level_up: apply_xp(&mut profile.profile, xp_awarded),
        badges_awarded: Vec::new(),
    };

    let badge = gold_badge(course.id);
    if grade == Grade::Gold && profile.grant_badge(&badge) {
        award.badges_awarded.push(badge);
    }

    TheoreticalOutcome {
        score_difference,
        grade,
        award,
    }
}

/// Normalise and validate a pet name.
pub fn parse_pet(raw: &str) -> Result<&'static str, UnknownPet> {
    let wanted = raw.trim().to_ascii_lowercase();
    PETS.iter()
        .copied()
        .find(|pet| *pet == wanted)
        .ok_or(UnknownPet(wanted))
}

pub fn select_pet(profile: &mut UserProfile, pet: &'static str) {
    profile.profile.avatar = Some(pet.to_owned());
}
