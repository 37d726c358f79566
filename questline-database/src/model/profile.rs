use serde::{Deserialize, Serialize};

use questline_utils::grade::Grade;

use super::course::Course;

/// Full profile document, stored and overwritten as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    /// Optimistic concurrency counter, bumped on every successful save.
    #[serde(default)]
    pub version: i64,
    pub profile: ProfileStats,
    pub progress: Progress,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub avatar: Option<String>,
    pub level: i64,
    pub current_xp: i64,
    pub total_xp: i64,
    #[serde(default)]
    pub badges: Vec<String>,
}

impl Default for ProfileStats {
    fn default() -> Self {
        Self {
            avatar: None,
            level: 1,
            current_xp: 0,
            total_xp: 0,
            badges: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub courses: Vec<CourseProgress>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course_id: u64,
    pub current: u32,
    #[serde(default)]
    pub completed_sub_levels: Vec<u32>,
    #[serde(default)]
    pub theoretical: TheoreticalRecord,
}

impl CourseProgress {
    /// A course nobody has touched yet.
    pub fn not_started(course_id: u64) -> Self {
        Self {
            course_id,
            current: 1,
            completed_sub_levels: Vec::new(),
            theoretical: TheoreticalRecord::default(),
        }
    }

    pub fn is_completed(&self, sub_level: u32) -> bool {
        self.completed_sub_levels.contains(&sub_level)
    }

    /// Restore set semantics on lists written by older documents.
    pub fn normalize(&mut self) {
        self.completed_sub_levels.sort_unstable();
        self.completed_sub_levels.dedup();
    }

    /// Insert into the completed set. Returns `false` if it was already there.
    pub fn mark_completed(&mut self, sub_level: u32) -> bool {
        match self.completed_sub_levels.binary_search(&sub_level) {
            Ok(_) => false,
            Err(index) => {
                self.completed_sub_levels.insert(index, sub_level);
                true
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoreticalRecord {
    pub score: u32,
    pub grade: Grade,
}

impl UserProfile {
    /// Default profile for a first-time learner, one entry per catalog course.
    pub fn new_default(uid: &str, email: &str, catalog: &[Course]) -> Self {
        Self {
            uid: uid.to_owned(),
            email: email.to_owned(),
            version: 0,
            profile: ProfileStats::default(),
            progress: Progress {
                goals: Vec::new(),
                courses: catalog
                    .iter()
                    .map(|course| CourseProgress::not_started(course.id))
                    .collect(),
            },
        }
    }

    pub fn normalize(&mut self) {
        for course in &mut self.progress.courses {
            course.normalize();
        }
    }

    pub fn course(&self, course_id: u64) -> Option<&CourseProgress> {
        self.progress
            .courses
            .iter()
            .find(|course| course.course_id == course_id)
    }

    /// Mutable progress for a course, inserting a not-started entry if absent.
    pub fn course_mut(&mut self, course_id: u64) -> &mut CourseProgress {
        let index = match self
            .progress
            .courses
            .iter()
            .position(|course| course.course_id == course_id)
        {
            Some(index) => index,
            None => {
                self.progress
                    .courses
                    .push(CourseProgress::not_started(course_id));
                self.progress.courses.len() - 1
            }
        };
        &mut self.progress.courses[index]
    }

    /// Add a badge if the profile does not hold it yet.
    pub fn grant_badge(&mut self, badge: &str) -> bool {
        if self.profile.badges.iter().any(|held| held == badge) {
            return false;
        }
        self.profile.badges.push(badge.to_owned());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{CourseProgress, UserProfile};
    use crate::model::course::builtin_catalog;

    #[test]
    fn default_profile_starts_every_catalog_course() {
        let profile = UserProfile::new_default("u1", "u1@example.com", &builtin_catalog());
        assert_eq!(profile.profile.level, 1);
        assert_eq!(profile.profile.total_xp, 0);
        assert!(profile.profile.badges.is_empty());
        assert_eq!(profile.progress.courses, vec![CourseProgress::not_started(1)]);
    }

    #[test]
    fn completed_set_stays_sorted_and_unique() {
        let mut progress = CourseProgress::not_started(1);
        assert!(progress.mark_completed(3));
        assert!(progress.mark_completed(1));
        assert!(!progress.mark_completed(3));
        assert_eq!(progress.completed_sub_levels, vec![1, 3]);
    }

    #[test]
    fn normalize_dedups_legacy_lists() {
        let mut progress = CourseProgress::not_started(1);
        progress.completed_sub_levels = vec![2, 1, 2];
        progress.normalize();
        assert_eq!(progress.completed_sub_levels, vec![1, 2]);
    }

    #[test]
    fn course_mut_inserts_missing_course() {
        let mut profile = UserProfile::new_default("u1", "", &[]);
        profile.course_mut(7).current = 2;
        assert_eq!(profile.course(7).map(|course| course.current), Some(2));
        assert_eq!(profile.progress.courses.len(), 1);
    }

    #[test]
    fn badges_are_a_set() {
        let mut profile = UserProfile::new_default("u1", "", &[]);
        assert!(profile.grant_badge("course-1-complete"));
        assert!(!profile.grant_badge("course-1-complete"));
        assert_eq!(profile.profile.badges.len(), 1);
    }

    #[test]
    fn documents_without_optional_fields_deserialize() {
        let raw = r#"{
            "uid": "u1",
            "email": "",
            "profile": {"avatar": null, "level": 1, "current_xp": 0, "total_xp": 0},
            "progress": {}
        }"#;
        let profile: UserProfile = serde_json::from_str(raw).expect("valid document");
        assert_eq!(profile.version, 0);
        assert!(profile.progress.courses.is_empty());
    }
}
